pub mod leaderboard;

pub mod projects;

pub mod submissions;

pub use leaderboard::configure_leaderboard_routes;
pub use projects::configure_projects_routes;
pub use submissions::configure_submissions_routes;

#[cfg(test)]
mod tests;
