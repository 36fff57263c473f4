use crate::{
    error::{transport_error, Result},
    remote::RemoteArchive,
};
use reqwest::blocking::{Client, Response};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The NOAA NGDC directory listing server, over blocking HTTP.
#[derive(Debug, Clone)]
pub struct NgdcRemote {
    client: Client,
}

impl NgdcRemote {
    /// Use a caller configured client, e.g. one with a request timeout.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| transport_error(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(url, format!("HTTP {}", status)));
        }

        Ok(response)
    }
}

impl RemoteArchive for NgdcRemote {
    fn connect() -> Result<Self>
    where
        Self: Sized,
    {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| transport_error("client", err))?;

        Ok(NgdcRemote { client })
    }

    fn retrieve_listing_page(&self, url: &str) -> Result<String> {
        self.get(url)?.text().map_err(|err| transport_error(url, err))
    }

    fn retrieve_remote_file(&self, url: &str) -> Result<Vec<u8>> {
        let data = self
            .get(url)?
            .bytes()
            .map_err(|err| transport_error(url, err))?;

        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_builds_client_without_network() {
        assert!(NgdcRemote::connect().is_ok());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(5))
            .build()
            .unwrap();
        let _remote = NgdcRemote::with_client(client);
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let remote = NgdcRemote::connect().unwrap();
        let url = "http://127.0.0.1:9/goes16/l2/data/suvi-l2-ci094/2020/01/01/";

        match remote.retrieve_listing_page(url) {
            Err(crate::GoesSolarError::Transport { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("unexpected result: {:?}", other.map(|s| s.len())),
        }
    }
}
