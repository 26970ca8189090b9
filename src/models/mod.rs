pub mod user;
pub mod commit;
pub mod scorecard;
pub mod analysis;
pub mod report;

pub use user::*;
pub use commit::*;
pub use scorecard::*;
pub use analysis::*;
pub use report::*;
