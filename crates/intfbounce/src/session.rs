//! SessionDriver - one switch, one stage, one CLI session.

use tracing::{debug, error, info, instrument, warn};

use sonic_bounce_common::{cli, Action, BounceResult, CliSession, Pacing, SessionConnector};

/// Drives the command sequence for one switch visit.
///
/// Each call to [`SessionDriver::configure_interfaces`] opens a session,
/// sends:
///
/// 1. `enable`, `config t`
/// 2. `interface <name>` + `shutdown` / `no shutdown` per interface
///
/// with the command delay after every line, plus the link settle delay after
/// each interface when re-enabling, and then closes the session. Output from
/// the switch is never parsed.
pub struct SessionDriver<C> {
    /// Opens sessions to switches.
    connector: C,

    /// Settling pauses.
    pacing: Pacing,
}

impl<C: SessionConnector> SessionDriver<C> {
    /// Creates a driver over a connector.
    pub fn new(connector: C, pacing: Pacing) -> Self {
        Self { connector, pacing }
    }

    /// Returns the connector.
    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Returns the pacing in use.
    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    /// Applies `action` to `interfaces` on `switch_ip`, in order.
    ///
    /// Failures are logged here with the switch address and returned; the
    /// caller decides nothing from them beyond bookkeeping. A session that
    /// was opened is closed before this returns, whatever happened.
    #[instrument(skip_all, fields(switch = %switch_ip, action = %action, transport = self.connector.name()))]
    pub async fn configure_interfaces(
        &self,
        switch_ip: &str,
        interfaces: &[String],
        action: Action,
    ) -> BounceResult<()> {
        info!("Connecting to switch {}", switch_ip);

        let mut session = match self.connector.connect(switch_ip).await {
            Ok(session) => session,
            Err(e) => {
                error!("Failed to configure the switch {}: {}", switch_ip, e);
                return Err(e);
            }
        };

        let result = self
            .apply(session.as_mut(), switch_ip, interfaces, action)
            .await;

        match &result {
            Ok(()) => info!(
                "All interfaces on {} have been {}",
                switch_ip,
                action.past_tense()
            ),
            Err(e) => error!("Failed to configure the switch {}: {}", switch_ip, e),
        }

        if let Err(e) = session.close().await {
            warn!("Error while closing session to {}: {}", switch_ip, e);
        }
        info!("Disconnected from switch {}", switch_ip);

        result
    }

    async fn apply(
        &self,
        session: &mut dyn CliSession,
        switch_ip: &str,
        interfaces: &[String],
        action: Action,
    ) -> BounceResult<()> {
        for command in cli::preamble() {
            self.run_command(session, command).await?;
        }

        for interface in interfaces {
            match action {
                Action::ShutDown => {
                    info!("Shutting down interface {} on {}", interface, switch_ip)
                }
                Action::NoShutDown => {
                    info!("Bringing up interface {} on {}", interface, switch_ip)
                }
            }

            for command in cli::interface_commands(interface, action) {
                self.run_command(session, &command).await?;
            }

            if action.settles_link() {
                debug!(
                    interface = %interface,
                    pause = ?self.pacing.link_settle_delay,
                    "Waiting for link to settle"
                );
                session.settle(self.pacing.link_settle_delay).await?;
            }
        }

        Ok(())
    }

    /// Sends one line and waits the command delay.
    async fn run_command(&self, session: &mut dyn CliSession, command: &str) -> BounceResult<()> {
        debug!(command = %command, "Sending command");
        session.send_line(command).await?;
        session.settle(self.pacing.command_delay).await
    }
}
