//! Sample tasks for a user's first session.
//!
//! Generation is a pure function of the random source, the user and the
//! current time, so a seeded [`rand::rngs::StdRng`] gives repeatable output.

use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use taskdeck_proto::task::{Task, TaskId, TaskStatus};
use uuid::Builder;

/// Number of tasks generated for a new user.
pub const SAMPLE_TASK_COUNT: usize = 50;

/// Probability that a generated task is still pending.
pub const SAMPLE_PENDING_RATIO: f64 = 0.7;

/// Generated tasks are created within this many days before now.
pub const SAMPLE_WINDOW_DAYS: i64 = 30;

const SAMPLE_TITLES: &[&str] = &[
    "Review project documentation",
    "Implement OAuth sign-in",
    "Fix bug on the login screen",
    "Update project dependencies",
    "Write unit tests",
    "Improve application performance",
    "Implement dark mode",
    "Review pull requests",
    "Document the API",
    "Set up CI/CD",
    "Refactor components",
    "Add a local cache",
    "Fix responsive layout",
    "Add form validation",
    "Implement push notifications",
    "Optimize images",
    "Set up analytics",
    "Support offline mode",
    "Review legacy code",
    "Update the README",
    "Configure linting",
    "Implement lazy loading",
    "Fix memory leaks",
    "Add HTTP interceptors",
    "Implement pagination",
    "Set up the development environment",
    "Add structured logging",
    "Reduce bundle size",
    "Tighten lint rules",
    "Introduce shared state management",
    "Add loading states",
    "Enable strict type checking",
    "Add error boundaries",
    "Add skeleton screens",
    "Configure the formatter",
    "Implement deep linking",
    "Optimize rendering",
    "Set up debugging tools",
    "Add animations",
    "Add visual feedback",
    "Configure the splash screen",
    "Add biometric unlock",
    "Optimize database queries",
    "Set up monitoring",
    "Implement data backup",
    "Compress uploaded images",
    "Configure rate limiting",
    "Add websocket support",
    "Improve search ranking",
    "Configure deployment",
];

const SAMPLE_DESCRIPTIONS: &[&str] = &[
    "Keeps the codebase healthy",
    "Improves the user experience",
    "Urgent fix for a critical issue",
    "Makes the application faster",
    "Routine maintenance to stay up to date",
    "New feature requested by users",
    "Refactoring to keep the code readable",
    "Required for the production environment",
    "Documentation to ease future maintenance",
    "Performance work",
];

/// Generates [`SAMPLE_TASK_COUNT`] tasks for `user_id`, oldest first.
///
/// Titles and descriptions are drawn from fixed catalogues (titles get a
/// `#n` suffix), creation times fall within [`SAMPLE_WINDOW_DAYS`] before
/// `now` at minute resolution, and each task is pending with probability
/// [`SAMPLE_PENDING_RATIO`].
pub fn generate_sample_tasks<R: Rng>(
    rng: &mut R,
    user_id: &str,
    now: DateTime<Utc>,
) -> Vec<Task> {
    let window_minutes = SAMPLE_WINDOW_DAYS * 24 * 60;

    let mut tasks: Vec<Task> = (0..SAMPLE_TASK_COUNT)
        .map(|i| {
            let title = SAMPLE_TITLES[rng.random_range(0..SAMPLE_TITLES.len())];
            let description = SAMPLE_DESCRIPTIONS[rng.random_range(0..SAMPLE_DESCRIPTIONS.len())];
            let age = TimeDelta::minutes(rng.random_range(0..window_minutes));
            let status = if rng.random_bool(SAMPLE_PENDING_RATIO) {
                TaskStatus::Pending
            } else {
                TaskStatus::Completed
            };

            Task {
                id: TaskId::from_uuid(Builder::from_random_bytes(rng.random()).into_uuid()),
                title: format!("{title} #{}", i + 1),
                description: description.to_string(),
                created_at: now - age,
                status,
                user_id: user_id.to_string(),
            }
        })
        .collect();

    tasks.sort_by_key(|t| t.created_at);
    tasks
}
