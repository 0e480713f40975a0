use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObservatoryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Reference data error: {0}")]
    ReferenceData(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] nocodb_client::NocoDbError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use nocodb_client::NocoDbError;

    #[test]
    fn client_errors_convert_into_fetch() {
        let err: ObservatoryError = NocoDbError::Api {
            status: 503,
            message: "maintenance".into(),
        }
        .into();
        assert!(matches!(err, ObservatoryError::Fetch(_)));
        assert_eq!(
            err.to_string(),
            "Fetch error: API error (status 503): maintenance"
        );
    }
}
