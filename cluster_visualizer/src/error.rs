use cluster_data::DataError;

#[derive(Debug, thiserror::Error)]
pub enum PlotError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("rendering failed: {0}")]
    Render(String),
    #[error("viewer failed: {0}")]
    Viewer(String),
}
