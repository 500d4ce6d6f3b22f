#![forbid(unsafe_code)]

//! Pointer-capture adapter for resizer drags.
//!
//! Bridges browser pointer lifecycle signals into [`PanelLayoutEngine`] calls
//! while enforcing:
//! - one active pointer at a time,
//! - explicit capture acquire/release commands for the host, and
//! - termination of the drag on interruption paths (cancel, blur,
//!   visibility change, lost capture).
//!
//! A drag only ends on the matching pointer-up or an interruption; keys such
//! as Escape are not part of the gesture. Double-click on a resizer resets
//! its neighbours to their layout defaults.

use std::time::Duration;

use sandbug_core::Point;
use sandbug_layout::{LayoutError, PanelLayoutEngine, ResizerId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Pointer buttons the host reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// What an interrupted drag does with the sizes reached so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptPolicy {
    /// Keep them, as if the pointer had been released.
    #[default]
    Commit,
    /// Restore the sizes from before the drag.
    Restore,
}

/// Adapter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResizerPointerConfig {
    /// Button required to begin a drag.
    pub activation_button: PointerButton,
    /// If true, pointer leave ends the drag when capture was requested but
    /// never acknowledged.
    pub cancel_on_leave_without_capture: bool,
    pub interrupt: InterruptPolicy,
}

impl Default for ResizerPointerConfig {
    fn default() -> Self {
        Self {
            activation_button: PointerButton::Primary,
            cancel_on_leave_without_capture: true,
            interrupt: InterruptPolicy::Commit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaptureState {
    Requested,
    Acquired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActivePointer {
    pointer_id: u32,
    target: ResizerId,
    button: PointerButton,
    capture_state: CaptureState,
}

impl ActivePointer {
    fn release(self) -> Option<CaptureCommand> {
        (self.capture_state == CaptureState::Acquired).then_some(CaptureCommand::Release {
            pointer_id: self.pointer_id,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DispatchContext {
    phase: LifecyclePhase,
    pointer_id: Option<u32>,
    target: Option<ResizerId>,
    position: Option<Point>,
}

/// Host command for browser pointer-capture control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureCommand {
    Acquire { pointer_id: u32 },
    Release { pointer_id: u32 },
}

/// Lifecycle phase recorded for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerLeave,
    Blur,
    VisibilityHidden,
    LostPointerCapture,
    CaptureAcquired,
    DoubleClick,
}

/// Why an incoming signal was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    InvalidPointerId,
    ButtonNotAllowed,
    ButtonMismatch,
    ActivePointerAlreadyInProgress,
    NoActivePointer,
    PointerMismatch,
    LeaveWhileCaptured,
    EngineRejected,
}

/// Engine-side effect of a forwarded signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEffect {
    Started,
    Moved { delta: f64 },
    /// Drag ended keeping the new sizes.
    Committed,
    /// Drag ended restoring the sizes from before it.
    Restored,
    ResetStarted,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogOutcome {
    Forwarded(DragEffect),
    CaptureStateUpdated,
    Ignored(IgnoredReason),
}

/// Structured record of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogEntry {
    pub phase: LifecyclePhase,
    pub sequence: Option<u64>,
    pub pointer_id: Option<u32>,
    pub target: Option<ResizerId>,
    pub position: Option<Point>,
    pub capture_command: Option<CaptureCommand>,
    pub outcome: LogOutcome,
}

/// Result of one pointer lifecycle dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizerDispatch {
    pub effect: Option<DragEffect>,
    pub capture_command: Option<CaptureCommand>,
    /// Engine refusal, when the outcome is [`IgnoredReason::EngineRejected`].
    pub error: Option<LayoutError>,
    pub log: LogEntry,
}

impl ResizerDispatch {
    fn ignored(context: DispatchContext, reason: IgnoredReason) -> Self {
        trace!(phase = ?context.phase, ?reason, "pointer signal ignored");
        Self {
            effect: None,
            capture_command: None,
            error: None,
            log: LogEntry {
                phase: context.phase,
                sequence: None,
                pointer_id: context.pointer_id,
                target: context.target,
                position: context.position,
                capture_command: None,
                outcome: LogOutcome::Ignored(reason),
            },
        }
    }
}

/// Deterministic pointer adapter for resizer elements.
///
/// The engine is borrowed per call; the adapter only tracks which pointer
/// owns the drag and the capture handshake.
#[derive(Debug, Clone)]
pub struct ResizerPointerAdapter {
    config: ResizerPointerConfig,
    active: Option<ActivePointer>,
    next_sequence: u64,
}

impl Default for ResizerPointerAdapter {
    fn default() -> Self {
        Self::new(ResizerPointerConfig::default())
    }
}

impl ResizerPointerAdapter {
    #[must_use]
    pub const fn new(config: ResizerPointerConfig) -> Self {
        Self {
            config,
            active: None,
            next_sequence: 1,
        }
    }

    #[must_use]
    pub const fn config(&self) -> ResizerPointerConfig {
        self.config
    }

    #[must_use]
    pub fn active_pointer_id(&self) -> Option<u32> {
        self.active.map(|active| active.pointer_id)
    }

    /// Handle pointer-down on a resizer.
    pub fn pointer_down(
        &mut self,
        engine: &mut PanelLayoutEngine,
        target: ResizerId,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> ResizerDispatch {
        let context = DispatchContext {
            phase: LifecyclePhase::PointerDown,
            pointer_id: Some(pointer_id),
            target: Some(target),
            position: Some(position),
        };
        if pointer_id == 0 {
            return ResizerDispatch::ignored(context, IgnoredReason::InvalidPointerId);
        }
        if button != self.config.activation_button {
            return ResizerDispatch::ignored(context, IgnoredReason::ButtonNotAllowed);
        }
        if self.active.is_some() {
            return ResizerDispatch::ignored(
                context,
                IgnoredReason::ActivePointerAlreadyInProgress,
            );
        }

        if let Err(err) = engine.begin_drag(target, position) {
            return self.forward(context, Err(err), None);
        }
        self.active = Some(ActivePointer {
            pointer_id,
            target,
            button,
            capture_state: CaptureState::Requested,
        });
        self.forward(
            context,
            Ok(DragEffect::Started),
            Some(CaptureCommand::Acquire { pointer_id }),
        )
    }

    /// Mark browser pointer capture as acquired.
    pub fn capture_acquired(&mut self, pointer_id: u32) -> ResizerDispatch {
        let mut context = DispatchContext {
            phase: LifecyclePhase::CaptureAcquired,
            pointer_id: Some(pointer_id),
            target: None,
            position: None,
        };
        let Some(mut active) = self.active else {
            return ResizerDispatch::ignored(context, IgnoredReason::NoActivePointer);
        };
        context.target = Some(active.target);
        if active.pointer_id != pointer_id {
            return ResizerDispatch::ignored(context, IgnoredReason::PointerMismatch);
        }
        active.capture_state = CaptureState::Acquired;
        self.active = Some(active);
        ResizerDispatch {
            effect: None,
            capture_command: None,
            error: None,
            log: LogEntry {
                phase: context.phase,
                sequence: None,
                pointer_id: context.pointer_id,
                target: context.target,
                position: None,
                capture_command: None,
                outcome: LogOutcome::CaptureStateUpdated,
            },
        }
    }

    /// Handle pointer-move during a drag.
    pub fn pointer_move(
        &mut self,
        engine: &mut PanelLayoutEngine,
        pointer_id: u32,
        position: Point,
    ) -> ResizerDispatch {
        let mut context = DispatchContext {
            phase: LifecyclePhase::PointerMove,
            pointer_id: Some(pointer_id),
            target: None,
            position: Some(position),
        };
        let Some(active) = self.active else {
            return ResizerDispatch::ignored(context, IgnoredReason::NoActivePointer);
        };
        context.target = Some(active.target);
        if active.pointer_id != pointer_id {
            return ResizerDispatch::ignored(context, IgnoredReason::PointerMismatch);
        }

        match engine.drag_move(position) {
            Ok(delta) => self.forward(context, Ok(DragEffect::Moved { delta }), None),
            Err(err) => {
                // The engine dropped the drag (layout switch); let go of the pointer.
                self.active = None;
                self.forward(context, Err(err), active.release())
            }
        }
    }

    /// Handle pointer-up: commit the drag and release capture.
    pub fn pointer_up(
        &mut self,
        engine: &mut PanelLayoutEngine,
        pointer_id: u32,
        button: PointerButton,
        position: Point,
    ) -> ResizerDispatch {
        let mut context = DispatchContext {
            phase: LifecyclePhase::PointerUp,
            pointer_id: Some(pointer_id),
            target: None,
            position: Some(position),
        };
        let Some(active) = self.active else {
            return ResizerDispatch::ignored(context, IgnoredReason::NoActivePointer);
        };
        context.target = Some(active.target);
        if active.pointer_id != pointer_id {
            return ResizerDispatch::ignored(context, IgnoredReason::PointerMismatch);
        }
        if active.button != button {
            return ResizerDispatch::ignored(context, IgnoredReason::ButtonMismatch);
        }

        self.active = None;
        let result = engine.end_drag().map(|_| DragEffect::Committed);
        self.forward(context, result, active.release())
    }

    /// Handle browser pointer-cancel.
    pub fn pointer_cancel(
        &mut self,
        engine: &mut PanelLayoutEngine,
        pointer_id: Option<u32>,
    ) -> ResizerDispatch {
        self.interrupt(engine, LifecyclePhase::PointerCancel, pointer_id, true)
    }

    /// Handle pointer-leave.
    pub fn pointer_leave(
        &mut self,
        engine: &mut PanelLayoutEngine,
        pointer_id: u32,
    ) -> ResizerDispatch {
        let mut context = DispatchContext {
            phase: LifecyclePhase::PointerLeave,
            pointer_id: Some(pointer_id),
            target: None,
            position: None,
        };
        let Some(active) = self.active else {
            return ResizerDispatch::ignored(context, IgnoredReason::NoActivePointer);
        };
        context.target = Some(active.target);
        if active.pointer_id != pointer_id {
            return ResizerDispatch::ignored(context, IgnoredReason::PointerMismatch);
        }
        if active.capture_state == CaptureState::Requested
            && self.config.cancel_on_leave_without_capture
        {
            self.interrupt(engine, LifecyclePhase::PointerLeave, Some(pointer_id), true)
        } else {
            ResizerDispatch::ignored(context, IgnoredReason::LeaveWhileCaptured)
        }
    }

    /// Handle window blur.
    pub fn blur(&mut self, engine: &mut PanelLayoutEngine) -> ResizerDispatch {
        self.interrupt(engine, LifecyclePhase::Blur, None, true)
    }

    /// Handle the page becoming hidden.
    pub fn visibility_hidden(&mut self, engine: &mut PanelLayoutEngine) -> ResizerDispatch {
        self.interrupt(engine, LifecyclePhase::VisibilityHidden, None, true)
    }

    /// Handle `lostpointercapture`; capture is already gone, so no release.
    pub fn lost_pointer_capture(
        &mut self,
        engine: &mut PanelLayoutEngine,
        pointer_id: u32,
    ) -> ResizerDispatch {
        self.interrupt(
            engine,
            LifecyclePhase::LostPointerCapture,
            Some(pointer_id),
            false,
        )
    }

    /// Handle double-click on a resizer: reset its neighbours, moving the
    /// master resizer along in layouts that position it.
    pub fn double_click(
        &mut self,
        engine: &mut PanelLayoutEngine,
        target: ResizerId,
        now: Duration,
    ) -> ResizerDispatch {
        let context = DispatchContext {
            phase: LifecyclePhase::DoubleClick,
            pointer_id: None,
            target: Some(target),
            position: None,
        };
        if self.active.is_some() {
            return ResizerDispatch::ignored(
                context,
                IgnoredReason::ActivePointerAlreadyInProgress,
            );
        }
        let with_resizer = target == ResizerId::Master;
        let result = engine
            .reset_panel_pair(target, with_resizer, now)
            .map(|()| DragEffect::ResetStarted);
        self.forward(context, result, None)
    }

    fn interrupt(
        &mut self,
        engine: &mut PanelLayoutEngine,
        phase: LifecyclePhase,
        pointer_id: Option<u32>,
        release_capture: bool,
    ) -> ResizerDispatch {
        let mut context = DispatchContext {
            phase,
            pointer_id,
            target: None,
            position: None,
        };
        let Some(active) = self.active else {
            return ResizerDispatch::ignored(context, IgnoredReason::NoActivePointer);
        };
        context.target = Some(active.target);
        if pointer_id.is_some_and(|id| id != active.pointer_id) {
            return ResizerDispatch::ignored(context, IgnoredReason::PointerMismatch);
        }
        context.pointer_id = Some(active.pointer_id);

        self.active = None;
        let result = match self.config.interrupt {
            InterruptPolicy::Commit => engine.end_drag().map(|_| DragEffect::Committed),
            InterruptPolicy::Restore => engine.cancel_drag().map(|_| DragEffect::Restored),
        };
        let command = if release_capture {
            active.release()
        } else {
            None
        };
        self.forward(context, result, command)
    }

    fn forward(
        &mut self,
        context: DispatchContext,
        result: Result<DragEffect, LayoutError>,
        capture_command: Option<CaptureCommand>,
    ) -> ResizerDispatch {
        let sequence = self.next_sequence();
        match result {
            Ok(effect) => {
                trace!(
                    sequence,
                    phase = ?context.phase,
                    target = ?context.target,
                    ?effect,
                    ?capture_command,
                    "pointer signal forwarded"
                );
                ResizerDispatch {
                    effect: Some(effect),
                    capture_command,
                    error: None,
                    log: LogEntry {
                        phase: context.phase,
                        sequence: Some(sequence),
                        pointer_id: context.pointer_id,
                        target: context.target,
                        position: context.position,
                        capture_command,
                        outcome: LogOutcome::Forwarded(effect),
                    },
                }
            }
            Err(err) => {
                debug!(
                    sequence,
                    phase = ?context.phase,
                    error = %err,
                    "engine rejected pointer signal"
                );
                let mut dispatch = ResizerDispatch::ignored(context, IgnoredReason::EngineRejected);
                dispatch.error = Some(err);
                dispatch.capture_command = capture_command;
                dispatch.log.sequence = Some(sequence);
                dispatch.log.capture_command = capture_command;
                dispatch
            }
        }
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);
        sequence
    }
}
