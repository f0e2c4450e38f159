//! Command router — runs deterministic handlers or delegates to the dispatcher.

use chrono::{DateTime, Local};
use std::sync::Arc;
use steward_actions::AppTable;
use steward_core::intent::slot;
use steward_core::{Intent, IntentKind, Launcher, MediaControl, Speaker};
use tracing::{debug, info, warn};
use crate::dispatcher::Dispatcher;
use crate::templates::ResponseTemplates;

pub const SHUTDOWN_REPLY: &str = "Shutting down. Take care.";

const TIME_FORMAT: &str = "%I:%M %p";
const DATE_FORMAT: &str = "%A, %d %B %Y";

/// What the caller should do after showing the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Keep the conversation going
    Continue(String),
    /// The user asked to exit; show the text, then shut down
    Terminate(String),
}

impl RouteOutcome {
    pub fn text(&self) -> &str {
        match self {
            Self::Continue(text) | Self::Terminate(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Continue(text) | Self::Terminate(text) => text,
        }
    }

    pub fn is_terminate(&self) -> bool {
        matches!(self, Self::Terminate(_))
    }
}

/// Maps intents to replies.
pub struct CommandRouter {
    dispatcher: Arc<Dispatcher>,
    templates: Arc<ResponseTemplates>,
    apps: AppTable,
    launcher: Arc<dyn Launcher>,
    media: Arc<dyn MediaControl>,
    clock: fn() -> DateTime<Local>,
}

impl CommandRouter {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        templates: Arc<ResponseTemplates>,
        apps: AppTable,
        launcher: Arc<dyn Launcher>,
        media: Arc<dyn MediaControl>,
    ) -> Self {
        Self {
            dispatcher,
            templates,
            apps,
            launcher,
            media,
            clock: Local::now,
        }
    }

    /// Replace the wall clock used by `get_time` and `get_date`.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Produce the reply for one intent. Only `exit` terminates.
    pub async fn route(&self, intent: &Intent) -> RouteOutcome {
        debug!(intent = %intent.kind(), confidence = intent.confidence(), "Routing intent");

        let text = match intent.kind() {
            IntentKind::Exit => return RouteOutcome::Terminate(SHUTDOWN_REPLY.to_string()),
            IntentKind::GetTime => {
                let now = (self.clock)().format(TIME_FORMAT).to_string();
                self.templates.render("get_time", &now)
            }
            IntentKind::GetDate => {
                let today = (self.clock)().format(DATE_FORMAT).to_string();
                self.templates.render("get_date", &today)
            }
            IntentKind::OpenApp => match intent.slot(slot::APP) {
                Some(app) => self.open_app(app),
                None => self.templates.render("fallback", ""),
            },
            IntentKind::PlayMusic => {
                match self.media.play().await {
                    Ok(()) => info!("Music started"),
                    Err(e) => warn!(error = %e, "Could not start music"),
                }
                self.templates.render("play_music", "")
            }
            IntentKind::StopMusic => {
                match self.media.stop().await {
                    Ok(()) => info!("Music stopped"),
                    Err(e) => warn!(error = %e, "Could not stop music"),
                }
                self.templates.render("stop_music", "")
            }
            IntentKind::Chat | IntentKind::AdviceTime | IntentKind::Unknown => {
                let prompt = intent.slot(slot::TEXT).unwrap_or_default();
                self.dispatcher.respond(prompt).await
            }
        };

        RouteOutcome::Continue(text)
    }

    /// Route, then hand the reply to `speaker`. Speech failures are logged only.
    pub async fn route_and_speak(&self, intent: &Intent, speaker: &dyn Speaker) -> RouteOutcome {
        let outcome = self.route(intent).await;
        if let Err(e) = speaker.speak(outcome.text()).await {
            warn!(speaker = speaker.name(), error = %e, "Could not speak reply");
        }
        outcome
    }

    fn open_app(&self, app: &str) -> String {
        let Some(target) = self.apps.resolve(app) else {
            info!(app = %app, "Unknown application");
            return format!("I don't know how to open {app}.");
        };

        match self.launcher.launch(target) {
            Ok(()) => {
                info!(app = %app, target = %target, "Opened application");
                self.templates.render("open_app", app)
            }
            Err(e) => {
                warn!(app = %app, error = %e, "Failed to open application");
                format!("Failed to open {app}.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::dispatcher::{DispatchSession, EMPTY_PROMPT_REPLY};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;
    use steward_core::error::{ActionError, SpeechError};
    use steward_core::{FixedProbe, LaunchTarget, ModelTier, TierOutcome, TierSet};

    /// Echoes prompts back and counts calls.
    struct EchoTier {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl ModelTier for EchoTier {
        fn name(&self) -> &str {
            "echo"
        }

        async fn invoke(&self, prompt: &str) -> TierOutcome {
            *self.calls.lock().unwrap() += 1;
            TierOutcome::reply(format!("echo: {prompt}"))
        }
    }

    struct RecordingLauncher {
        fail: bool,
        launched: Mutex<Vec<LaunchTarget>>,
    }

    impl Launcher for RecordingLauncher {
        fn launch(&self, target: &LaunchTarget) -> Result<(), ActionError> {
            self.launched.lock().unwrap().push(target.clone());
            if self.fail {
                Err(ActionError::SpawnFailed {
                    target: target.to_string(),
                    reason: "scripted".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    struct CountingMedia {
        plays: Mutex<usize>,
        stops: Mutex<usize>,
    }

    #[async_trait]
    impl MediaControl for CountingMedia {
        async fn play(&self) -> Result<(), ActionError> {
            *self.plays.lock().unwrap() += 1;
            Err(ActionError::NotFound("music folder".into()))
        }

        async fn stop(&self) -> Result<(), ActionError> {
            *self.stops.lock().unwrap() += 1;
            Ok(())
        }
    }

    struct RecordingSpeaker {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Speaker for RecordingSpeaker {
        fn name(&self) -> &str {
            "recording"
        }

        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_string());
            Err(SpeechError::NoEngine)
        }
    }

    struct Fixture {
        tier: Arc<EchoTier>,
        launcher: Arc<RecordingLauncher>,
        media: Arc<CountingMedia>,
        router: CommandRouter,
    }

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 21, 5, 0).unwrap()
    }

    fn fixture(launch_fails: bool) -> Fixture {
        let tier = Arc::new(EchoTier {
            calls: Mutex::new(0),
        });
        let tiers = TierSet::new(tier.clone(), tier.clone(), tier.clone());
        let dispatcher = Arc::new(Dispatcher::new(
            tiers,
            Arc::new(FixedProbe(false)),
            DispatchSession::shared(),
            "prime",
        ));
        let templates = ResponseTemplates::from_json(
            r#"{
                "get_time": ["It's {value}."],
                "get_date": ["Today is {value}."],
                "open_app": ["Opening {value}."],
                "play_music": ["Playing music."],
                "stop_music": ["Stopping music."],
                "fallback": ["Come again?"]
            }"#,
        )
        .unwrap();
        let mut apps = AppTable::new();
        apps.insert("notepad", LaunchTarget::Program("notepad.exe".into()));
        let launcher = Arc::new(RecordingLauncher {
            fail: launch_fails,
            launched: Mutex::new(Vec::new()),
        });
        let media = Arc::new(CountingMedia {
            plays: Mutex::new(0),
            stops: Mutex::new(0),
        });

        let router = CommandRouter::new(
            dispatcher,
            Arc::new(templates),
            apps,
            launcher.clone(),
            media.clone(),
        )
        .with_clock(fixed_clock);

        Fixture {
            tier,
            launcher,
            media,
            router,
        }
    }

    #[tokio::test]
    async fn exit_terminates_without_dispatch() {
        let f = fixture(false);
        let intent = classify("exit");
        assert_eq!(intent.kind(), IntentKind::Exit);
        assert_eq!(intent.confidence(), 1.0);

        let outcome = f.router.route(&intent).await;
        assert_eq!(outcome, RouteOutcome::Terminate(SHUTDOWN_REPLY.into()));
        assert_eq!(*f.tier.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn time_and_date_use_local_clock() {
        let f = fixture(false);
        assert_eq!(
            f.router.route(&classify("what time is it")).await,
            RouteOutcome::Continue("It's 09:05 PM.".into())
        );
        assert_eq!(
            f.router.route(&classify("what's today's date")).await,
            RouteOutcome::Continue("Today is Saturday, 09 March 2024.".into())
        );
    }

    #[tokio::test]
    async fn open_known_app() {
        let f = fixture(false);
        let outcome = f.router.route(&classify("open app named notepad please")).await;
        assert_eq!(outcome.text(), "Opening notepad.");
        assert_eq!(
            *f.launcher.launched.lock().unwrap(),
            vec![LaunchTarget::Program("notepad.exe".into())]
        );
    }

    #[tokio::test]
    async fn open_unknown_app() {
        let f = fixture(false);
        let outcome = f.router.route(&classify("open photoshop")).await;
        assert_eq!(outcome.text(), "I don't know how to open photoshop.");
        assert!(f.launcher.launched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_app_spawn_failure() {
        let f = fixture(true);
        let outcome = f.router.route(&classify("open notepad")).await;
        assert_eq!(outcome, RouteOutcome::Continue("Failed to open notepad.".into()));
    }

    #[tokio::test]
    async fn open_app_without_slot_uses_fallback() {
        let f = fixture(false);
        let intent = Intent::new(IntentKind::OpenApp, 0.9);
        assert_eq!(f.router.route(&intent).await.text(), "Come again?");
    }

    #[tokio::test]
    async fn music_reply_does_not_depend_on_action() {
        let f = fixture(false);
        // play fails in the mock, the reply is unchanged
        assert_eq!(f.router.route(&classify("play music")).await.text(), "Playing music.");
        assert_eq!(f.router.route(&classify("stop music")).await.text(), "Stopping music.");
        assert_eq!(*f.media.plays.lock().unwrap(), 1);
        assert_eq!(*f.media.stops.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn conversational_intents_are_dispatched() {
        let f = fixture(false);
        assert_eq!(
            f.router.route(&classify("Tell me a joke")).await.text(),
            "echo: tell me a joke"
        );
        assert_eq!(
            f.router.route(&classify("best time to sleep")).await.text(),
            "echo: best time to sleep"
        );
        assert_eq!(*f.tier.calls.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn unknown_intent_hits_empty_guard() {
        let f = fixture(false);
        assert_eq!(
            f.router.route(&classify("   ")).await,
            RouteOutcome::Continue(EMPTY_PROMPT_REPLY.into())
        );
        assert_eq!(*f.tier.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn route_and_speak_speaks_and_returns_same_outcome() {
        let f = fixture(false);
        let speaker = RecordingSpeaker {
            spoken: Mutex::new(Vec::new()),
        };

        let outcome = f.router.route_and_speak(&classify("bye"), &speaker).await;
        assert!(outcome.is_terminate());
        // The speaker's failure does not change the outcome
        assert_eq!(*speaker.spoken.lock().unwrap(), vec![SHUTDOWN_REPLY]);
    }
}
