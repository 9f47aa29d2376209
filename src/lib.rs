//! Session state and solve client for the eyespot reaction-diffusion viewer

pub mod camera;
pub mod export;
pub mod gateway;
pub mod parameters;
pub mod precursor;
pub mod render;
pub mod session;
pub mod solution;
pub mod store;
pub mod toast;
pub mod viewer;

pub use camera::{Camera, CameraStore};
pub use export::{ExportError, ImageExporter};
pub use gateway::{GatewayConfig, SolveError, SolveGateway, SolveRequest};
pub use parameters::{ParameterError, ParameterStore, Parameters};
pub use precursor::{PrecursorSquareStore, Square};
pub use render::Renderer;
pub use session::{Session, SolveTicket};
pub use solution::{Frame, Pigment, Solution, SolutionStore};
pub use store::{Store, Subscription};
pub use toast::{Toast, ToastColor, ToastQueue};
pub use viewer::ViewerApp;
