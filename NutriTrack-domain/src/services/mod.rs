// Domain services
// Business logic on top of the stores and the remote collaborators.

pub mod account;
pub mod analysis;
pub mod background;
pub mod insights;
pub mod meals;
pub mod planner;
pub mod profile;
pub mod sync;

pub use account::{AccountError, AccountService, LoggedIn, Registered};
pub use analysis::{AnalysisError, AnalysisOutcome, FoodAnalysisService};
pub use background::{BackgroundSyncWorker, SyncJob, SyncScheduler};
pub use meals::{MealService, MealServiceError};
pub use planner::{MealPlanGenerator, PlanError, RandomSource, ThreadRandom};
pub use profile::{ProfileService, ProfileServiceError};
pub use sync::{FullSyncReport, LoginSync, ProfilePull, RegistrationSync, SyncEngine, SyncError};
