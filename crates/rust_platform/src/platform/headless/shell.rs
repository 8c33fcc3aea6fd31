use std::rc::Rc;

use super::host::HeadlessHost;
use super::simulated_failure;
use crate::components::{BatteryStatus, InitContext, PalComponents, ShellComponent, ThemeInfo};
use crate::error::PalResult;
use crate::foundation::logging::pal_log;
use crate::platform::{delegate_component, ComponentCore};

/// Shell state of the headless host
pub struct HeadlessShellComponent {
    core: ComponentCore,
    host: Rc<HeadlessHost>,
}

impl HeadlessShellComponent {
    pub(crate) fn new(host: Rc<HeadlessHost>) -> Self {
        Self {
            core: ComponentCore::new("HeadlessShellComponent", PalComponents::SHELL, "pal::shell"),
            host,
        }
    }

    fn prepare(&self, context: &InitContext<'_>) -> PalResult<()> {
        simulated_failure(&self.host, context.requested)
    }

    fn release_all(&self) {
        self.host.screensaver_allowed.set(true);
    }
}

delegate_component!(HeadlessShellComponent);

impl ShellComponent for HeadlessShellComponent {
    fn allow_screensaver(&self, allow: bool) -> PalResult<()> {
        self.host.screensaver_allowed.set(allow);
        pal_log!(self.core.logger(), Debug, "screensaver allowed: {allow}");
        Ok(())
    }

    fn is_screensaver_allowed(&self) -> PalResult<bool> {
        Ok(self.host.screensaver_allowed.get())
    }

    fn get_battery_info(&self) -> PalResult<BatteryStatus> {
        Ok(self.host.options().battery)
    }

    fn get_preferred_theme(&self) -> PalResult<ThemeInfo> {
        Ok(self.host.theme.borrow().clone())
    }
}
