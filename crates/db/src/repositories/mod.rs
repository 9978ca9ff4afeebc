pub mod plan_repo;
pub mod user_repo;

pub use plan_repo::PlanRepo;
pub use user_repo::UserRepo;
