//! Minimal guest module: `GET` anything to get a greeting, `POST /echo` to
//! get the request body back.

use http::header::{CONTENT_TYPE, HeaderValue};
use http::{Method, Request, StatusCode};
use httpshrew_core::ResponseRecorder;

pub const GREETING: &[u8] = b"hello from user code";

pub fn serve(request: Request<Vec<u8>>, response: &mut ResponseRecorder) {
    log::debug!("echo guest serving {} {}", request.method(), request.uri());
    match (request.method(), request.uri().path()) {
        (&Method::POST, "/echo") => {
            if let Some(content_type) = request.headers().get(CONTENT_TYPE) {
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, content_type.clone());
            }
            response.write_header(StatusCode::OK);
            response.write(request.body());
        }
        (&Method::GET, _) => {
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
            response.write_header(StatusCode::OK);
            response.write(GREETING);
        }
        _ => {
            response.headers_mut().insert(
                http::header::ALLOW,
                HeaderValue::from_static("GET, POST"),
            );
            response.write_header(StatusCode::METHOD_NOT_ALLOWED);
        }
    }
}

/// Install [`serve`] as the process-wide handler.
pub fn register() {
    httpshrew_core::set_handler(serve);
}

#[cfg(target_arch = "wasm32")]
#[unsafe(no_mangle)]
pub extern "C" fn _initialize() {
    register();
}
