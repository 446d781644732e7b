use crate::models::Intent;

/// Keywords, patterns and acceptance threshold for one intent.
pub struct IntentDefinition {
    pub intent: Intent,
    pub keywords: &'static [&'static str],
    pub patterns: &'static [&'static str],
    pub threshold: f64,
}

pub const TAXONOMY: &[IntentDefinition] = &[
    IntentDefinition {
        intent: Intent::Booking,
        keywords: &["book", "reserve", "reservation", "availability", "available", "schedule"],
        patterns: &[
            r"\b(book|reserve|make.*reservation)\b",
            r"\b(available|availability)\b",
            r"\b(check.*in|check.*out)\b",
        ],
        threshold: 0.6,
    },
    IntentDefinition {
        intent: Intent::Information,
        keywords: &[
            "information", "info", "tell", "what", "where", "when", "how", "hours", "time", "location",
        ],
        patterns: &[
            r"\b(what|where|when|how|why)\b",
            r"\b(information|info|tell.*me|explain)\b",
            r"\b(hours|opening|closing|time)\b",
            r"\b(location|address|directions)\b",
        ],
        threshold: 0.5,
    },
    IntentDefinition {
        intent: Intent::Pricing,
        keywords: &["price", "cost", "fee", "charge", "expensive", "cheap", "discount", "rate"],
        patterns: &[
            r"\b(price|cost|fee|charge|rate)\b",
            r"\b(expensive|cheap|affordable)\b",
            r"\b(discount|offer|deal|promotion)\b",
            r"\$\d+|\d+.*dollar",
        ],
        threshold: 0.7,
    },
    IntentDefinition {
        intent: Intent::Complaint,
        keywords: &[
            "complaint", "problem", "issue", "wrong", "bad", "terrible", "disappointed", "unsatisfied",
        ],
        patterns: &[
            r"\b(complaint|complain|problem|issue)\b",
            r"\b(wrong|bad|terrible|awful|horrible)\b",
            r"\b(disappointed|unsatisfied|unhappy)\b",
        ],
        threshold: 0.8,
    },
    IntentDefinition {
        intent: Intent::Cancellation,
        keywords: &["cancel", "cancellation", "refund", "change", "modify"],
        patterns: &[
            r"\b(cancel|cancellation)\b",
            r"\b(refund|money.*back)\b",
            r"\b(change|modify|reschedule)\b",
        ],
        threshold: 0.8,
    },
    IntentDefinition {
        intent: Intent::Recommendation,
        keywords: &["recommend", "suggest", "best", "good", "popular", "famous", "must", "should"],
        patterns: &[
            r"\b(recommend|suggest|advice)\b",
            r"\b(best|good|great|popular|famous)\b",
            r"\b(must.*see|should.*visit|worth.*visiting)\b",
        ],
        threshold: 0.6,
    },
    IntentDefinition {
        intent: Intent::Directions,
        keywords: &["direction", "how to get", "way", "route", "transport", "bus", "train", "taxi"],
        patterns: &[
            r"\b(direction|how.*get|way.*to)\b",
            r"\b(route|path|navigate)\b",
            r"\b(transport|bus|train|taxi|uber|metro)\b",
        ],
        threshold: 0.7,
    },
    IntentDefinition {
        intent: Intent::Weather,
        keywords: &["weather", "temperature", "rain", "sunny", "cloudy", "forecast"],
        patterns: &[
            r"\b(weather|temperature|climate)\b",
            r"\b(rain|sunny|cloudy|snow|storm)\b",
            r"\b(forecast|today.*weather|tomorrow.*weather)\b",
        ],
        threshold: 0.8,
    },
    IntentDefinition {
        intent: Intent::Greeting,
        keywords: &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"],
        patterns: &[
            r"\b(hello|hi|hey|greetings)\b",
            r"\b(good\s*(morning|afternoon|evening|day))\b",
        ],
        threshold: 0.9,
    },
    IntentDefinition {
        intent: Intent::Goodbye,
        keywords: &["bye", "goodbye", "see you", "farewell", "thanks", "thank you"],
        patterns: &[
            r"\b(bye|goodbye|farewell)\b",
            r"\b(see.*you|talk.*later)\b",
            r"\b(thanks|thank.*you)\b",
        ],
        threshold: 0.9,
    },
];
