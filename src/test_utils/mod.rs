pub(crate) mod http;
pub(crate) mod remote;

pub(crate) use http::{assert_status, parse_json_body};
pub(crate) use remote::FakeRemoteStore;
