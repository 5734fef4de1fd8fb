use snafu::{Location, Snafu};
use tokio::task::JoinError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to join tasks"))]
    Join {
        #[snafu(implicit)]
        location: Location,
        error: JoinError,
    },
    #[snafu(display(
        "Failed to estimate distance between positions, from '{from:?}', to '{to:?}', error '{error_stringified}'"
    ))]
    DistanceEstimation {
        #[snafu(implicit)]
        location: Location,
        error_stringified: String,
        from: geoutils::Location,
        to: geoutils::Location,
    },
}
