//! SSH transport for switch CLI sessions.
//!
//! Opens a password-authenticated SSH connection, requests a PTY and an
//! interactive shell, and writes command lines into it. Output the switch
//! produces is drained while a settling pause runs so the channel never
//! backs up; it is logged at debug level and otherwise ignored.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::keys::{HashAlg, PublicKey};
use russh::{Channel, ChannelMsg, Disconnect};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use sonic_bounce_common::{
    cli, BounceConfig, BounceError, BounceResult, CliSession, Credentials, HostKeyPolicy,
    SessionConnector,
};

/// Terminal type requested for the shell.
const TERMINAL_TYPE: &str = "vt100";

/// Terminal width; wide enough that long interface names do not wrap.
const TERMINAL_COLS: u32 = 200;

/// Terminal height.
const TERMINAL_ROWS: u32 = 24;

/// Opens SSH sessions with the shared credentials.
pub struct SshConnector {
    client_config: Arc<client::Config>,
    credentials: Credentials,
    port: u16,
    host_key_policy: HostKeyPolicy,
    connect_timeout: Option<Duration>,
}

impl SshConnector {
    /// Builds a connector from the run configuration.
    ///
    /// Fails if no password is available or the host key policy cannot be
    /// resolved.
    pub fn new(config: &BounceConfig) -> BounceResult<Self> {
        config.credentials.password()?;
        let host_key_policy = config.ssh.resolved_host_key_policy()?;

        match &host_key_policy {
            HostKeyPolicy::AcceptAny => {
                warn!("Host key verification is disabled; any switch key will be trusted")
            }
            HostKeyPolicy::KnownHosts(path) => {
                info!("Verifying switch host keys against {}", path.display())
            }
        }

        Ok(Self {
            client_config: Arc::new(client::Config::default()),
            credentials: config.credentials.clone(),
            port: config.ssh.port,
            host_key_policy,
            connect_timeout: config.ssh.connect_timeout(),
        })
    }

    /// Returns the host key policy in effect.
    pub fn host_key_policy(&self) -> &HostKeyPolicy {
        &self.host_key_policy
    }

    async fn open(&self, switch_ip: &str) -> BounceResult<SshSession> {
        let handler = HostKeyCheck {
            host: switch_ip.to_string(),
            port: self.port,
            policy: self.host_key_policy.clone(),
        };

        let connect = client::connect(self.client_config.clone(), (switch_ip, self.port), handler);
        let connected = match self.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
                BounceError::connection(switch_ip, format!("connect timed out after {:?}", limit))
            })?,
            None => connect.await,
        };
        let mut handle = connected.map_err(|e| BounceError::connection(switch_ip, e))?;

        match self.start_shell(&mut handle, switch_ip).await {
            Ok(channel) => Ok(SshSession {
                switch: switch_ip.to_string(),
                handle,
                channel,
            }),
            Err(e) => {
                if let Err(close_err) = disconnect(&handle).await {
                    debug!(switch = %switch_ip, "Disconnect after failed setup: {}", close_err);
                }
                Err(e)
            }
        }
    }

    async fn start_shell(
        &self,
        handle: &mut Handle<HostKeyCheck>,
        switch_ip: &str,
    ) -> BounceResult<Channel<Msg>> {
        // Checked in new().
        let password = self.credentials.password()?;

        let auth = handle
            .authenticate_password(self.credentials.username.as_str(), password)
            .await
            .map_err(|e| BounceError::connection(switch_ip, e))?;
        if !auth.success() {
            return Err(BounceError::connection(
                switch_ip,
                format!(
                    "authentication rejected for user '{}'",
                    self.credentials.username
                ),
            ));
        }

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| BounceError::connection(switch_ip, e))?;
        channel
            .request_pty(false, TERMINAL_TYPE, TERMINAL_COLS, TERMINAL_ROWS, 0, 0, &[])
            .await
            .map_err(|e| BounceError::connection(switch_ip, e))?;
        channel
            .request_shell(false)
            .await
            .map_err(|e| BounceError::connection(switch_ip, e))?;

        debug!(switch = %switch_ip, "Interactive shell opened");
        Ok(channel)
    }
}

#[async_trait]
impl SessionConnector for SshConnector {
    async fn connect(&self, switch_ip: &str) -> BounceResult<Box<dyn CliSession>> {
        let session = self.open(switch_ip).await?;
        Ok(Box::new(session))
    }

    fn name(&self) -> &str {
        "ssh"
    }
}

/// Host key check applied while the SSH handshake runs.
struct HostKeyCheck {
    host: String,
    port: u16,
    policy: HostKeyPolicy,
}

impl client::Handler for HostKeyCheck {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        let fingerprint = server_public_key.fingerprint(HashAlg::Sha256);

        match &self.policy {
            HostKeyPolicy::AcceptAny => {
                warn!(switch = %self.host, %fingerprint, "Accepting unverified host key");
                Ok(true)
            }
            HostKeyPolicy::KnownHosts(path) => {
                match russh::keys::check_known_hosts_path(&self.host, self.port, server_public_key, path) {
                    Ok(true) => {
                        debug!(switch = %self.host, %fingerprint, "Host key verified");
                        Ok(true)
                    }
                    Ok(false) => {
                        error!(
                            switch = %self.host,
                            %fingerprint,
                            "Host key not found in {}",
                            path.display()
                        );
                        Ok(false)
                    }
                    Err(e) => {
                        error!(switch = %self.host, %fingerprint, "Host key check failed: {}", e);
                        Ok(false)
                    }
                }
            }
        }
    }
}

/// An open shell on one switch.
pub struct SshSession {
    switch: String,
    handle: Handle<HostKeyCheck>,
    channel: Channel<Msg>,
}

#[async_trait]
impl CliSession for SshSession {
    async fn send_line(&mut self, line: &str) -> BounceResult<()> {
        if !cli::is_single_line(line) {
            return Err(BounceError::internal(format!(
                "refusing to send multi-line command {:?}",
                line
            )));
        }

        let payload = format!("{}{}", line, cli::LINE_ENDING);
        self.channel
            .data(payload.as_bytes())
            .await
            .map_err(|e| BounceError::connection(&self.switch, e))
    }

    async fn settle(&mut self, pause: Duration) -> BounceResult<()> {
        let deadline = Instant::now() + pause;

        loop {
            match tokio::time::timeout_at(deadline, self.channel.wait()).await {
                Err(_elapsed) => return Ok(()),
                Ok(Some(ChannelMsg::Data { data })) => {
                    debug!(
                        switch = %self.switch,
                        bytes = data.len(),
                        "Device output: {}",
                        String::from_utf8_lossy(&data).trim_end()
                    );
                }
                Ok(Some(ChannelMsg::Eof)) | Ok(Some(ChannelMsg::Close)) | Ok(None) => {
                    return Err(BounceError::connection(
                        &self.switch,
                        "session closed by remote",
                    ));
                }
                Ok(Some(_)) => {}
            }
        }
    }

    async fn close(&mut self) -> BounceResult<()> {
        if let Err(e) = self.channel.eof().await {
            debug!(switch = %self.switch, "Channel EOF failed: {}", e);
        }
        disconnect(&self.handle)
            .await
            .map_err(|e| BounceError::connection(&self.switch, e))
    }
}

async fn disconnect(handle: &Handle<HostKeyCheck>) -> Result<(), russh::Error> {
    handle
        .disconnect(Disconnect::ByApplication, "", "English")
        .await
}
