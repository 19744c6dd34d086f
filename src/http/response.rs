//! Action output normalization.
//!
//! # Responsibilities
//! - Turn whatever an action returned into the response sent to the client
//!
//! # Design Decisions
//! - `View` renders into the body of the response being built
//! - A `Response` returned by the action replaces it, status included
//! - `String` and `&'static str` become the body as-is
//! - `()` and every other type are programmer errors (`UnexpectedOutput`)

use axum::body::Body;
use axum::response::Response;

use crate::container::Instance;
use crate::mvc::DispatchError;
use crate::view::View;

/// Apply `output` to `response`. `output_type` names the action's return
/// type for error reporting.
pub fn normalize(
    output: Instance,
    output_type: &'static str,
    mut response: Response,
) -> Result<Response, DispatchError> {
    let output = match output.downcast::<View>() {
        Ok(view) => {
            *response.body_mut() = Body::from(view.render()?);
            return Ok(response);
        }
        Err(other) => other,
    };
    let output = match output.downcast::<Response>() {
        Ok(passthrough) => return Ok(*passthrough),
        Err(other) => other,
    };
    let output = match output.downcast::<String>() {
        Ok(text) => {
            *response.body_mut() = Body::from(*text);
            return Ok(response);
        }
        Err(other) => other,
    };
    if let Some(text) = output.downcast_ref::<&'static str>() {
        *response.body_mut() = Body::from(*text);
        return Ok(response);
    }

    let found = if output.is::<()>() {
        "null output".to_string()
    } else {
        format!("object of type {output_type}")
    };
    Err(DispatchError::UnexpectedOutput { found })
}
