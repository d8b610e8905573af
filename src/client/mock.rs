//! Mock implementations of the client seams for tests.

use mockall::mock;

use crate::client::errors::ApiError;
use crate::client::session::ClientSession;
use crate::client::sink::ErrorSink;

mock! {
    pub ErrorSink {}

    impl ErrorSink for ErrorSink {
        fn report(&self, error: &ApiError);
    }
}

mock! {
    pub ClientSession {}

    impl ClientSession for ClientSession {
        fn token(&self) -> Option<String>;
        fn sign_out(&self);
    }
}
