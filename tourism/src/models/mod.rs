mod analytics;
mod engagement;
mod forecast;
mod intent;
mod observation;
mod review;
mod sentiment;

pub use analytics::*;
pub use engagement::*;
pub use forecast::*;
pub use intent::*;
pub use observation::*;
pub use review::*;
pub use sentiment::*;
