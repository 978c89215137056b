use closeguard_core::services::UnloadController;
use std::cell::RefCell;
use std::rc::Rc;

/// State of a window's beforeunload handlers, shared between the window's
/// controller and the host that answers them.
#[derive(Default)]
pub struct UnloadScript {
    has_beforeunload: bool,
    handlers_done: bool,
    attempting: bool,
    awaiting_user: bool,
    on_close_confirmed: Option<Box<dyn FnMut(bool)>>,
}

impl UnloadScript {
    pub fn has_beforeunload(&self) -> bool {
        self.has_beforeunload
    }

    /// A beforeunload dialog is up
    pub fn is_awaiting_user(&self) -> bool {
        self.awaiting_user
    }

    /// Record the user's answer to the beforeunload dialog. Returns the
    /// callback registered by `try_to_close_window`, if any; the caller
    /// runs it once the script is no longer borrowed.
    pub fn resolve(&mut self, proceed: bool) -> Option<Box<dyn FnMut(bool)>> {
        self.awaiting_user = false;
        if proceed {
            self.handlers_done = true;
        } else {
            self.attempting = false;
        }
        self.on_close_confirmed.take()
    }
}

/// Unload controller for a window whose pages may have beforeunload handlers
pub struct ScriptedUnload {
    script: Rc<RefCell<UnloadScript>>,
}

impl ScriptedUnload {
    pub fn new(has_beforeunload: bool) -> (Self, Rc<RefCell<UnloadScript>>) {
        let script = Rc::new(RefCell::new(UnloadScript {
            has_beforeunload,
            ..UnloadScript::default()
        }));
        (
            Self {
                script: script.clone(),
            },
            script,
        )
    }
}

impl UnloadController for ScriptedUnload {
    fn should_close_window(&mut self) -> bool {
        let mut script = self.script.borrow_mut();
        if !script.has_beforeunload || script.handlers_done {
            return true;
        }

        if !script.awaiting_user {
            tracing::debug!("Running beforeunload handlers");
        }
        script.attempting = true;
        script.awaiting_user = true;
        false
    }

    fn try_to_close_window(
        &mut self,
        skip_beforeunload: bool,
        mut on_close_confirmed: Box<dyn FnMut(bool)>,
    ) -> bool {
        let mut script = self.script.borrow_mut();
        if !script.has_beforeunload || script.handlers_done {
            return false;
        }

        if skip_beforeunload {
            script.handlers_done = true;
            drop(script);
            on_close_confirmed(true);
            return false;
        }

        script.attempting = true;
        script.awaiting_user = true;
        script.on_close_confirmed = Some(on_close_confirmed);
        true
    }

    fn reset_try_to_close_window(&mut self) {
        let mut script = self.script.borrow_mut();
        script.handlers_done = false;
        script.attempting = false;
        script.awaiting_user = false;
        script.on_close_confirmed = None;
    }

    fn cancel_window_close(&mut self) {
        let mut script = self.script.borrow_mut();
        script.attempting = false;
        script.awaiting_user = false;
    }

    fn is_attempting_to_close(&self) -> bool {
        self.script.borrow().attempting
    }
}
