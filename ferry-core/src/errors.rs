use snafu::{Location, Snafu};

pub type CoreResult<T> = std::result::Result<T, Error>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("An unexpected error occurred"))]
    Unexpected {
        #[snafu(implicit)]
        location: Location,
        error: BoxError,
    },
}
