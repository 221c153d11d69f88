// src/session.rs
// Device session gateway: one shared heat pump handle, bracketed per request

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::device::HeatPump;
use crate::error::{HtError, Result};

/// Owns the single heat pump connection of the process.
///
/// Every device operation goes through [`DeviceSession::interact`], which
/// serializes callers, logs in before the operation and logs out after it.
#[derive(Clone)]
pub struct DeviceSession {
    device: Arc<Mutex<Box<dyn HeatPump>>>,
}

impl DeviceSession {
    pub fn new(device: impl HeatPump + 'static) -> Self {
        Self {
            device: Arc::new(Mutex::new(Box::new(device))),
        }
    }

    /// Run `f` against the logged-in device.
    ///
    /// Callers queue on the session lock, so device calls never interleave.
    /// The operation runs on the blocking pool; logout happens on every exit
    /// path, including a panic inside `f`.
    ///
    /// # Example
    /// ```ignore
    /// let serial = session.interact(|hp| hp.get_serial_number()).await?;
    /// ```
    pub async fn interact<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn HeatPump) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let mut device = self.device.clone().lock_owned().await;

        tokio::task::spawn_blocking(move || {
            let mut session = LoggedIn::acquire(&mut **device)?;
            f(&mut *session)
        })
        .await?
    }
}

/// Login guard; logs out when dropped
struct LoggedIn<'a> {
    device: &'a mut dyn HeatPump,
}

impl<'a> LoggedIn<'a> {
    /// Log in, reconnecting once if the transport is down or the first
    /// attempt fails
    fn acquire(device: &'a mut dyn HeatPump) -> Result<Self> {
        if !device.is_open() {
            debug!("Serial connection down, opening");
            device.open_connection().map_err(connectivity)?;
        }

        if let Err(e) = device.login() {
            warn!("Login failed ({}), reconnecting", e);
            device.close_connection();
            device.open_connection().map_err(connectivity)?;
            device.login().map_err(connectivity)?;
        }

        debug!("Logged in to heat pump");
        Ok(Self { device })
    }
}

impl<'a> Deref for LoggedIn<'a> {
    type Target = dyn HeatPump + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.device
    }
}

impl DerefMut for LoggedIn<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.device
    }
}

impl Drop for LoggedIn<'_> {
    fn drop(&mut self) {
        match self.device.logout() {
            Ok(()) => debug!("Logged out from heat pump"),
            Err(e) => warn!("Logout failed: {}", e),
        }
    }
}

fn connectivity(err: HtError) -> HtError {
    match err {
        HtError::Connectivity(_) => err,
        other => HtError::Connectivity(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{ParamCatalog, SimulatedHeatPump};

    fn session() -> (DeviceSession, crate::device::SimProbe) {
        let hp = SimulatedHeatPump::new(ParamCatalog::builtin().unwrap());
        let probe = hp.probe();
        (DeviceSession::new(hp), probe)
    }

    #[tokio::test]
    async fn test_interact_brackets_login_and_logout() {
        let (session, probe) = session();
        let serial = session.interact(|hp| hp.get_serial_number()).await.unwrap();
        assert_eq!(serial, 123_456);
        assert_eq!(probe.logins(), 1);
        assert_eq!(probe.logouts(), 1);
        assert!(!probe.is_logged_in());
    }

    #[tokio::test]
    async fn test_logout_runs_when_operation_fails() {
        let (session, probe) = session();
        let result: Result<()> = session
            .interact(|_| Err(HtError::Device("boom".to_string())))
            .await;
        assert!(matches!(result, Err(HtError::Device(_))));
        assert_eq!(probe.logins(), 1);
        assert_eq!(probe.logouts(), 1);
    }

    #[tokio::test]
    async fn test_logout_runs_when_operation_panics() {
        let (session, probe) = session();
        let result: Result<()> = session.interact(|_| panic!("driver bug")).await;
        assert!(matches!(result, Err(HtError::Other(_))));
        assert_eq!(probe.logouts(), 1);

        // the session stays usable afterwards
        assert!(session.interact(|hp| hp.get_serial_number()).await.is_ok());
        assert_eq!(probe.logins(), 2);
        assert_eq!(probe.logouts(), 2);
    }

    #[tokio::test]
    async fn test_login_failure_aborts_before_operation() {
        let (session, probe) = session();
        probe.fail_logins(2);
        let result = session
            .interact(|_| -> Result<()> { panic!("must not run") })
            .await;
        assert!(matches!(result, Err(HtError::Connectivity(_))));
        assert_eq!(probe.logins(), 0);
        assert_eq!(probe.logouts(), 0);
    }

    #[tokio::test]
    async fn test_single_reconnect_on_login() {
        let (session, probe) = session();
        session.interact(|hp| hp.get_serial_number()).await.unwrap();

        probe.drop_transport();
        assert!(session.interact(|hp| hp.get_serial_number()).await.is_ok());

        probe.fail_logins(1);
        assert!(session.interact(|hp| hp.get_serial_number()).await.is_ok());
        assert_eq!(probe.logins(), 3);
    }

    #[tokio::test]
    async fn test_logout_failure_does_not_mask_result() {
        let (session, probe) = session();
        probe.fail_logouts(true);
        let serial = session.interact(|hp| hp.get_serial_number()).await.unwrap();
        assert_eq!(serial, 123_456);
        assert_eq!(probe.logouts(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_are_serialized() {
        let (session, probe) = session();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let session = session.clone();
            let probe = probe.clone();
            handles.push(tokio::spawn(async move {
                session
                    .interact(move |hp| {
                        // only one caller may be logged in at a time
                        assert_eq!(probe.logins(), probe.logouts() + 1);
                        hp.get_serial_number()
                    })
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }
        assert_eq!(probe.logins(), 8);
        assert_eq!(probe.logouts(), 8);
    }
}
