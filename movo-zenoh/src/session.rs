use crate::error::WrapperError;
use std::{path::Path, sync::Arc};
use zenoh::{prelude::r#async::*, Session};
use zenoh_config::Config;

/// Builds a zenoh config from an optional file plus endpoint overrides
pub fn zenoh_config(
    config_file: Option<&Path>,
    listen: &[String],
    connect: &[String],
) -> Result<Config, WrapperError> {
    let mut config = match config_file {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if !listen.is_empty() {
        config.listen.endpoints = parse_endpoints(listen)?;
    }
    if !connect.is_empty() {
        config.connect.endpoints = parse_endpoints(connect)?;
    }
    Ok(config)
}

fn parse_endpoints<T>(endpoints: &[String]) -> Result<Vec<T>, WrapperError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    endpoints
        .iter()
        .map(|endpoint| {
            endpoint
                .parse()
                .map_err(|error: T::Err| WrapperError::InvalidEndpoint {
                    endpoint: endpoint.clone(),
                    reason: error.to_string(),
                })
        })
        .collect()
}

pub async fn open_session(config: Config) -> Result<Arc<Session>, WrapperError> {
    let session = zenoh::open(config).res().await?;
    Ok(session.into_arc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_override_defaults() {
        let config = zenoh_config(
            None,
            &["tcp/127.0.0.1:7447".to_owned()],
            &["tcp/10.0.0.2:7447".to_owned(), "udp/10.0.0.3:7447".to_owned()],
        )
        .unwrap();
        assert_eq!(config.listen.endpoints.len(), 1);
        assert_eq!(config.connect.endpoints.len(), 2);
    }

    #[test]
    fn bad_endpoint_is_rejected() {
        let result = zenoh_config(None, &["not an endpoint".to_owned()], &[]);
        assert!(matches!(
            result,
            Err(WrapperError::InvalidEndpoint { .. })
        ));
    }

    #[test]
    fn missing_config_file_fails() {
        let result = zenoh_config(Some(Path::new("/nonexistent/zenoh.json5")), &[], &[]);
        assert!(result.is_err());
    }
}
