use common::config::Config;
use common::notify::Notifier;

use crate::dispatch::SignalDispatcher;

/// Everything the message handlers need, passed through the dispatcher's
/// dependency injection instead of living in process globals.
pub struct AppContext {
    pub config: Config,
    pub notifier: Notifier,
    pub dispatcher: SignalDispatcher,
}
