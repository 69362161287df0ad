pub mod config;
pub mod event;

use config::{AdvertisingData, AdvertisingParams};
use event::GapEvent;

use crate::{
    bt::BtStatus,
    error::{PeripheralError, Result, SetupStage},
    peripheral::Outcome,
    stack::GapCommands,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvertisingState {
    Idle,
    PayloadPending,
    Starting,
    Advertising,
    // Link layer stopped advertising because a central connected.
    Suspended,
    // Payload or start failure; only `restart` or `configure` leave this state.
    Stopped,
}

/// Drives the advertising half of GAP: payload first, then start, then
/// restarts after each disconnect reusing the accepted payload.
pub struct AdvertisingController {
    data: AdvertisingData,
    params: AdvertisingParams,
    state: AdvertisingState,
    payload_accepted: bool,

    retries: u8,
    retries_left: u8,
}

impl AdvertisingController {
    pub fn new(data: AdvertisingData, params: AdvertisingParams, retries: u8) -> Self {
        Self {
            data,
            params,
            state: AdvertisingState::Idle,
            payload_accepted: false,
            retries,
            retries_left: retries,
        }
    }

    pub fn state(&self) -> AdvertisingState {
        self.state
    }

    /// Hands the advertisement payload to the stack. Starting waits for the
    /// payload-set confirmation.
    pub fn configure<G: GapCommands + ?Sized>(&mut self, gap: &G) -> Result<Outcome> {
        if self.payload_accepted || self.state == AdvertisingState::PayloadPending {
            log::debug!("Advertising payload already configured, skipping");
            return Ok(Outcome::Ignored);
        }

        gap.configure_advertising(&self.data)
            .map_err(PeripheralError::command("configure advertising"))?;
        self.state = AdvertisingState::PayloadPending;

        Ok(Outcome::Handled)
    }

    /// Starts advertising again with the payload the stack already holds.
    ///
    /// Issued whatever the current state once the payload is accepted: a
    /// connection stops advertising in the link layer even when its start
    /// confirmation has not been seen yet.
    pub fn restart<G: GapCommands + ?Sized>(&mut self, gap: &G) -> Result<Outcome> {
        if !self.payload_accepted {
            log::warn!("Advertising payload not accepted yet, restart ignored");
            return Ok(Outcome::Ignored);
        }

        log::info!("Restarting advertising from state {:?}", self.state);
        self.retries_left = self.retries;
        self.start(gap)?;

        Ok(Outcome::Handled)
    }

    /// A central connected, so the controller no longer advertises. A start
    /// confirmation still in flight is dropped.
    pub fn suspend(&mut self) {
        if matches!(
            self.state,
            AdvertisingState::Starting | AdvertisingState::Advertising
        ) {
            self.state = AdvertisingState::Suspended;
        }
    }

    pub fn handle_event<G: GapCommands + ?Sized>(
        &mut self,
        gap: &G,
        event: &GapEvent,
    ) -> Result<Outcome> {
        match (self.state, event) {
            (AdvertisingState::PayloadPending, GapEvent::AdvertisingConfigured(status)) => {
                if *status != BtStatus::Success {
                    self.state = AdvertisingState::Stopped;
                    return Err(PeripheralError::SetupFailed {
                        stage: SetupStage::AdvertisingPayload,
                        status: (*status).into(),
                    });
                }

                log::info!("Advertising payload configured");
                self.payload_accepted = true;
                self.retries_left = self.retries;
                self.start(gap)?;

                Ok(Outcome::Handled)
            }
            (AdvertisingState::Starting, GapEvent::AdvertisingStarted(status)) => {
                if *status == BtStatus::Success {
                    log::info!("Advertising started successfully");
                    self.state = AdvertisingState::Advertising;
                    return Ok(Outcome::Handled);
                }

                if self.retries_left > 0 {
                    self.retries_left -= 1;
                    log::warn!(
                        "Advertising failed to start ({:?}), retrying ({} retries left)",
                        status,
                        self.retries_left
                    );
                    self.start(gap)?;
                    return Ok(Outcome::Handled);
                }

                log::error!("Advertising failed");
                self.state = AdvertisingState::Stopped;
                Err(PeripheralError::SetupFailed {
                    stage: SetupStage::AdvertisingStart,
                    status: (*status).into(),
                })
            }
            (AdvertisingState::Advertising, GapEvent::AdvertisingStopped(_)) => {
                self.state = AdvertisingState::Stopped;
                Ok(Outcome::Handled)
            }
            (state, event) => {
                log::debug!("Ignoring GAP event {:?} in state {:?}", event, state);
                Ok(Outcome::Ignored)
            }
        }
    }

    fn start<G: GapCommands + ?Sized>(&mut self, gap: &G) -> Result<()> {
        if let Err(err) = gap.start_advertising(&self.params) {
            self.state = AdvertisingState::Stopped;
            return Err(PeripheralError::command("start advertising")(err));
        }
        self.state = AdvertisingState::Starting;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::recording::{Command, RecordingStack};

    fn controller(retries: u8) -> AdvertisingController {
        AdvertisingController::new(
            AdvertisingData::default(),
            AdvertisingParams::default(),
            retries,
        )
    }

    fn starts(stack: &RecordingStack) -> usize {
        stack.count(|c| matches!(c, Command::StartAdvertising(_)))
    }

    fn advertising(stack: &RecordingStack, retries: u8) -> AdvertisingController {
        let mut adv = controller(retries);
        adv.configure(stack).unwrap();
        adv.handle_event(stack, &GapEvent::AdvertisingConfigured(BtStatus::Success))
            .unwrap();
        adv.handle_event(stack, &GapEvent::AdvertisingStarted(BtStatus::Success))
            .unwrap();
        adv
    }

    #[test]
    fn payload_confirmation_starts_advertising() {
        let stack = RecordingStack::new();
        let mut adv = controller(0);

        adv.configure(&stack).unwrap();
        assert_eq!(adv.state(), AdvertisingState::PayloadPending);

        let outcome = adv
            .handle_event(&stack, &GapEvent::AdvertisingConfigured(BtStatus::Success))
            .unwrap();
        assert_eq!(outcome, Outcome::Handled);
        assert_eq!(adv.state(), AdvertisingState::Starting);

        adv.handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Success))
            .unwrap();
        assert_eq!(adv.state(), AdvertisingState::Advertising);

        assert_eq!(
            stack.commands(),
            vec![
                Command::ConfigureAdvertising(AdvertisingData::default()),
                Command::StartAdvertising(AdvertisingParams::default()),
            ]
        );
    }

    #[test]
    fn start_confirmation_before_payload_is_ignored() {
        let stack = RecordingStack::new();
        let mut adv = controller(0);

        let outcome = adv
            .handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Success))
            .unwrap();

        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(adv.state(), AdvertisingState::Idle);
        assert!(stack.commands().is_empty());
    }

    #[test]
    fn configure_is_issued_once() {
        let stack = RecordingStack::new();
        let mut adv = advertising(&stack, 0);

        assert_eq!(adv.configure(&stack).unwrap(), Outcome::Ignored);
        assert_eq!(
            stack.count(|c| matches!(c, Command::ConfigureAdvertising(_))),
            1
        );
    }

    #[test]
    fn payload_failure_is_reported() {
        let stack = RecordingStack::new();
        let mut adv = controller(0);
        adv.configure(&stack).unwrap();

        let err = adv
            .handle_event(&stack, &GapEvent::AdvertisingConfigured(BtStatus::Fail))
            .unwrap_err();

        assert!(matches!(
            err,
            PeripheralError::SetupFailed {
                stage: SetupStage::AdvertisingPayload,
                ..
            }
        ));
        assert_eq!(adv.state(), AdvertisingState::Stopped);
        assert_eq!(starts(&stack), 0);
        // Nothing to restart from without a payload.
        assert_eq!(adv.restart(&stack).unwrap(), Outcome::Ignored);
    }

    #[test]
    fn start_failure_retries_then_stops() {
        let stack = RecordingStack::new();
        let mut adv = controller(2);
        adv.configure(&stack).unwrap();
        adv.handle_event(&stack, &GapEvent::AdvertisingConfigured(BtStatus::Success))
            .unwrap();

        for _ in 0..2 {
            adv.handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Fail))
                .unwrap();
            assert_eq!(adv.state(), AdvertisingState::Starting);
        }

        let err = adv
            .handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Fail))
            .unwrap_err();
        assert!(matches!(
            err,
            PeripheralError::SetupFailed {
                stage: SetupStage::AdvertisingStart,
                ..
            }
        ));
        assert_eq!(adv.state(), AdvertisingState::Stopped);
        assert_eq!(starts(&stack), 3);
    }

    #[test]
    fn restart_reuses_payload() {
        let stack = RecordingStack::new();
        let mut adv = advertising(&stack, 0);
        stack.take();

        adv.suspend();
        assert_eq!(adv.state(), AdvertisingState::Suspended);

        assert_eq!(adv.restart(&stack).unwrap(), Outcome::Handled);
        assert_eq!(
            stack.commands(),
            vec![Command::StartAdvertising(AdvertisingParams::default())]
        );
        assert_eq!(adv.state(), AdvertisingState::Starting);
    }

    #[test]
    fn connect_while_starting_suspends() {
        let stack = RecordingStack::new();
        let mut adv = controller(0);
        adv.configure(&stack).unwrap();
        adv.handle_event(&stack, &GapEvent::AdvertisingConfigured(BtStatus::Success))
            .unwrap();

        adv.suspend();
        assert_eq!(adv.state(), AdvertisingState::Suspended);

        let outcome = adv
            .handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Success))
            .unwrap();
        assert_eq!(outcome, Outcome::Ignored);
        assert_eq!(adv.state(), AdvertisingState::Suspended);
    }

    #[test]
    fn restart_is_issued_in_any_state_after_payload() {
        let stack = RecordingStack::new();
        let mut adv = advertising(&stack, 1);
        stack.take();

        assert_eq!(adv.restart(&stack).unwrap(), Outcome::Handled);
        assert_eq!(adv.state(), AdvertisingState::Starting);
        assert_eq!(adv.restart(&stack).unwrap(), Outcome::Handled);
        assert_eq!(starts(&stack), 2);
    }

    #[test]
    fn restart_resets_retry_budget() {
        let stack = RecordingStack::new();
        let mut adv = advertising(&stack, 1);
        adv.suspend();
        adv.restart(&stack).unwrap();
        adv.handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Fail))
            .unwrap();

        adv.restart(&stack).unwrap();
        adv.handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Fail))
            .unwrap();

        assert_eq!(adv.state(), AdvertisingState::Starting);
        assert_eq!(starts(&stack), 5);
    }

    #[test]
    fn restart_recovers_after_start_failure() {
        let stack = RecordingStack::new();
        let mut adv = controller(0);
        adv.configure(&stack).unwrap();
        adv.handle_event(&stack, &GapEvent::AdvertisingConfigured(BtStatus::Success))
            .unwrap();
        adv.handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Fail))
            .unwrap_err();

        assert_eq!(adv.restart(&stack).unwrap(), Outcome::Handled);
        adv.handle_event(&stack, &GapEvent::AdvertisingStarted(BtStatus::Success))
            .unwrap();
        assert_eq!(adv.state(), AdvertisingState::Advertising);
    }

    #[test]
    fn rejected_start_command_stops_advertising() {
        let stack = RecordingStack::new();
        stack.reject("start_advertising");
        let mut adv = controller(0);
        adv.configure(&stack).unwrap();

        let err = adv
            .handle_event(&stack, &GapEvent::AdvertisingConfigured(BtStatus::Success))
            .unwrap_err();

        assert!(matches!(err, PeripheralError::Command { .. }));
        assert_eq!(adv.state(), AdvertisingState::Stopped);
    }
}
