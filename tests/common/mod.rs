#![allow(dead_code)]

use routeshape::dispatcher::HandlerResponse;
use routeshape::{InjectRequest, Instance, InstanceOptions};

/// Instance with default options and the given tweaks applied
pub fn app_with(tweak: impl FnOnce(&mut InstanceOptions)) -> Instance {
    let mut options = InstanceOptions::default();
    tweak(&mut options);
    Instance::new(options)
}

pub fn get(app: &Instance, url: &str) -> HandlerResponse {
    app.inject(InjectRequest::get(url))
}

/// Assert the `{statusCode, error, message}` error shape and return the message
pub fn error_message(resp: &HandlerResponse, status: u16) -> String {
    assert_eq!(resp.status, status, "unexpected response: {:?}", resp.body);
    assert_eq!(resp.body["statusCode"], status);
    assert!(resp.body["error"].is_string());
    resp.body["message"].as_str().unwrap_or_default().to_string()
}
