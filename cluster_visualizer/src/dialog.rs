use std::collections::VecDeque;

use eframe::egui;

/// Modal window with a message and a row of buttons.
pub(crate) struct Dialog {
    title: String,
    message: String,
    buttons: Vec<Button>,
    /// Button whose action runs when the window is closed.
    has_exit: Option<usize>,
    is_open: bool,
    requested_focus: bool,
}

pub(crate) struct Button {
    pub(crate) label: String,
    /// Returns true if the dialog is done.
    pub(crate) action: Box<dyn Fn() -> bool>,
}
impl Button {
    pub(crate) fn ok() -> Self {
        Self {
            label: "Ok".to_string(),
            action: Box::new(|| true),
        }
    }
    #[must_use]
    fn show(&self, ui: &mut egui::Ui, requested_focus: &mut bool) -> bool {
        let button = ui.button(&self.label);
        if !*requested_focus {
            button.request_focus();
            *requested_focus = true;
        }
        if button.clicked() {
            (self.action)()
        } else {
            false
        }
    }
}

impl Dialog {
    pub(crate) fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        buttons: Vec<Button>,
        has_exit: Option<usize>,
    ) -> Self {
        debug_assert!(!buttons.is_empty(), "Dialog without buttons is not allowed");
        Self {
            title: title.into(),
            message: message.into(),
            buttons,
            has_exit,
            is_open: true,
            requested_focus: false,
        }
    }
    pub(crate) fn error(title: impl Into<String>, error: &dyn std::error::Error) -> Self {
        Self::new(title, error.to_string(), vec![Button::ok()], Some(0))
    }

    #[must_use]
    fn show(&mut self, ui: &mut egui::Ui) -> bool {
        let Self {
            message,
            buttons,
            requested_focus,
            ..
        } = self;
        ui.label(message.as_str());
        ui.horizontal(|ui| {
            for button in buttons.iter() {
                if button.show(ui, requested_focus) {
                    return true;
                }
            }
            false
        })
        .inner
    }

    fn close(&self) -> bool {
        match self.has_exit.and_then(|index| self.buttons.get(index)) {
            Some(Button { label: _, action }) => action(),
            None => true,
        }
    }
}

#[derive(Default)]
pub(crate) struct DialogWidget {
    dialogs: VecDeque<Dialog>,
    current_dialog: Option<Dialog>,
}

impl DialogWidget {
    pub(crate) fn push(&mut self, dialog: Dialog) {
        self.dialogs.push_back(dialog)
    }
    pub(crate) fn is_empty(&self) -> bool {
        self.current_dialog.is_none() && self.dialogs.is_empty()
    }
    /// Shows the current dialog. Returns true once no dialog is pending, the
    /// rest of the window stays disabled until then.
    pub(crate) fn progress(&mut self, ctx: &egui::Context) -> bool {
        if self.current_dialog.is_none() {
            self.current_dialog = self.dialogs.pop_front();
        }
        let Some(dialog) = self.current_dialog.as_mut() else {
            return true;
        };
        let mut is_open = dialog.is_open;
        let window = egui::Window::new(dialog.title.as_str())
            .collapsible(false)
            .auto_sized()
            .resizable(false)
            .pivot(egui::Align2::CENTER_CENTER)
            .default_pos(ctx.input(|x| x.screen_rect()).center());
        let window = if dialog.has_exit.is_some() {
            window.open(&mut is_open)
        } else {
            window
        };
        let shown = window.show(ctx, |ui| dialog.show(ui));
        let is_done = match shown {
            // the window was closed with its exit button
            None => dialog.close(),
            Some(response) => response.inner.unwrap_or(false),
        };
        dialog.is_open = is_open;
        if is_done {
            self.current_dialog = None;
        }
        self.is_empty()
    }
}

#[test]
fn pending_dialogs_block_until_done() {
    let ctx = egui::Context::default();
    let mut widget = DialogWidget::default();
    assert!(widget.is_empty());
    widget.push(Dialog::error(
        "Saving failed",
        &std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
    ));
    let mut done = true;
    let _ = ctx.run(egui::RawInput::default(), |ctx| {
        done = widget.progress(ctx);
    });
    assert!(!done);
    assert!(!widget.is_empty());
}
