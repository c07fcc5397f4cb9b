pub mod http;
pub mod response;
pub mod serialization;
pub mod session;
pub mod transmission;

pub use http::{HttpRequest, HttpResponse, HttpSession, RequestError, SessionOptions};
pub use response::{ResponseError, check_response};
pub use session::ReqwestSession;
pub use transmission::{BatchTransmitter, ChannelError, UploadSummary};
