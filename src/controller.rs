/// The controller capability polled by host loops, plus the trivial
/// always-false implementation and the setter-injection contract.
use std::sync::Arc;

/// Answers whether a long-running loop should stop or pause.
///
/// Hosts call these once per iteration. Implementations must never block
/// and never fail: every query returns a plain `bool`.
pub trait Controller: Send + Sync {
    /// Whether the host should stop processing.
    fn should_stop(&self) -> bool;

    /// Whether the host should suspend processing until told otherwise.
    fn should_pause(&self) -> bool;

    /// Whether the host should exit.
    ///
    /// Alias of [`Controller::should_stop`], kept for callers written
    /// against the older single-purpose API.
    #[deprecated(note = "use `should_stop` instead")]
    fn should_exit(&self) -> bool {
        self.should_stop()
    }
}

impl<C: Controller + ?Sized> Controller for Box<C> {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }

    fn should_pause(&self) -> bool {
        (**self).should_pause()
    }
}

impl<C: Controller + ?Sized> Controller for Arc<C> {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }

    fn should_pause(&self) -> bool {
        (**self).should_pause()
    }
}

impl<C: Controller + ?Sized> Controller for &C {
    fn should_stop(&self) -> bool {
        (**self).should_stop()
    }

    fn should_pause(&self) -> bool {
        (**self).should_pause()
    }
}

/// A controller that never asks the host to stop or pause.
///
/// The default policy, and the safe fallback when signal handling is
/// unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullController;

impl Controller for NullController {
    fn should_stop(&self) -> bool {
        false
    }

    fn should_pause(&self) -> bool {
        false
    }
}

/// Implemented by collaborators that receive their controller after
/// construction rather than through their constructor.
pub trait ControllerAware {
    fn set_controller(&mut self, controller: Arc<dyn Controller>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_controller_never_stops() {
        let controller = NullController;
        assert!(!controller.should_stop());
    }

    #[test]
    fn test_null_controller_never_pauses() {
        let controller = NullController;
        assert!(!controller.should_pause());
    }

    #[test]
    #[allow(deprecated)]
    fn test_null_controller_never_exits() {
        let controller = NullController;
        assert!(!controller.should_exit());
    }

    #[test]
    fn test_null_controller_is_stable_across_calls() {
        let controller = NullController;
        for _ in 0..10 {
            assert!(!controller.should_stop());
            assert!(!controller.should_pause());
        }
    }

    struct Fixed {
        stop: bool,
        pause: bool,
    }

    impl Controller for Fixed {
        fn should_stop(&self) -> bool {
            self.stop
        }

        fn should_pause(&self) -> bool {
            self.pause
        }
    }

    #[test]
    #[allow(deprecated)]
    fn test_should_exit_delegates_to_should_stop() {
        assert!(Fixed {
            stop: true,
            pause: false
        }
        .should_exit());
        assert!(!Fixed {
            stop: false,
            pause: true
        }
        .should_exit());
    }

    #[test]
    fn test_boxed_arc_and_borrowed_controllers_forward() {
        fn ask<C: Controller>(controller: C) -> bool {
            controller.should_stop()
        }

        let fixed = Fixed {
            stop: true,
            pause: true,
        };
        assert!(ask(&fixed));

        let boxed: Box<dyn Controller> = Box::new(Fixed {
            stop: false,
            pause: true,
        });
        assert!(!boxed.should_stop());
        assert!(boxed.should_pause());

        let shared: Arc<dyn Controller> = Arc::new(Fixed {
            stop: true,
            pause: false,
        });
        assert!(shared.should_stop());
        assert!(!shared.should_pause());
    }

    #[derive(Default)]
    struct Worker {
        controller: Option<Arc<dyn Controller>>,
    }

    impl ControllerAware for Worker {
        fn set_controller(&mut self, controller: Arc<dyn Controller>) {
            self.controller = Some(controller);
        }
    }

    #[test]
    fn test_controller_aware_stores_injected_controller() {
        let mut worker = Worker::default();
        assert!(worker.controller.is_none());

        worker.set_controller(Arc::new(Fixed {
            stop: true,
            pause: false,
        }));

        let controller = worker.controller.as_ref().unwrap();
        assert!(controller.should_stop());
    }
}
