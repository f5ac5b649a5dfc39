use std::fmt;
use std::time::{Duration, Instant};

use crate::client::ApiClient;
use crate::error::Result;
use crate::scenarios::Scenario;
use crate::settings::{FixtureMode, Settings};
use crate::stories::StoryApi;

/// Values one scenario leaves behind for later ones.
#[derive(Debug, Default, Clone)]
pub struct SharedState {
    pub last_story_id: Option<String>,
}

/// Everything a scenario can touch while the suite is running.
pub struct SuiteContext {
    pub api: StoryApi,
    pub state: SharedState,
    pub fixture_mode: FixtureMode,
}

impl SuiteContext {
    pub fn new(api: StoryApi, fixture_mode: FixtureMode) -> Self {
        SuiteContext {
            api,
            state: SharedState::default(),
            fixture_mode,
        }
    }

    /// The id captured by the List scenario. A missing id is not an error here; the
    /// request goes out with an empty id and the scenario fails on the server's answer.
    pub fn shared_story_id(&self) -> String {
        self.state.last_story_id.clone().unwrap_or_default()
    }

    fn missing_shared_id(&self, scenario: Scenario) -> bool {
        self.fixture_mode == FixtureMode::Shared
            && scenario.needs_shared_id()
            && self.state.last_story_id.is_none()
    }

    fn teardown(self) {
        self.api.close();
        log::info!("Client released");
    }
}

#[derive(Debug)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub result: Result<()>,
    pub elapsed: Duration,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            Ok(()) => write!(f, "PASS {} ({} ms)", self.scenario, self.elapsed.as_millis()),
            Err(e) => write!(
                f,
                "FAIL {} ({} ms): {}",
                self.scenario,
                self.elapsed.as_millis(),
                e
            ),
        }
    }
}

#[derive(Debug, Default)]
pub struct SuiteReport {
    pub outcomes: Vec<ScenarioOutcome>,
}

impl SuiteReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn outcome(&self, scenario: Scenario) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.scenario == scenario)
    }
}

impl fmt::Display for SuiteReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for outcome in &self.outcomes {
            writeln!(f, "{}", outcome)?;
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}

/// Runs scenarios in declared order against one authenticated client.
pub struct Suite {
    settings: Settings,
    scenarios: Vec<Scenario>,
}

impl Suite {
    pub fn new(settings: Settings) -> Self {
        Suite {
            settings,
            scenarios: Scenario::ALL.to_vec(),
        }
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Keeps only the named scenarios. Declared order wins over the order of `names`.
    pub fn select<S: AsRef<str>>(mut self, names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        let wanted = names
            .iter()
            .map(|n| n.as_ref().parse::<Scenario>())
            .collect::<Result<Vec<_>>>()?;
        self.scenarios = Scenario::ALL
            .iter()
            .copied()
            .filter(|s| wanted.contains(s))
            .collect();
        Ok(self)
    }

    /// Setup failures (configuration, login) abort the run. Scenario failures are
    /// recorded and the next scenario still runs.
    pub async fn run(self) -> Result<SuiteReport> {
        log::info!(
            "Running {} scenario(s) against {} with {} fixtures",
            self.scenarios.len(),
            self.settings.base_url,
            self.settings.fixture_mode
        );

        let client = ApiClient::connect(&self.settings).await?;
        let mut ctx = SuiteContext::new(StoryApi::new(client), self.settings.fixture_mode);
        let mut report = SuiteReport::default();

        for scenario in self.scenarios {
            log::info!("Starting {}", scenario);
            if ctx.missing_shared_id(scenario) {
                log::warn!("{} runs without a captured story id", scenario);
            }
            let started = Instant::now();
            let result = scenario.run(&mut ctx).await;
            let outcome = ScenarioOutcome {
                scenario,
                result,
                elapsed: started.elapsed(),
            };
            match &outcome.result {
                Ok(()) => log::info!("{}", outcome),
                Err(_) => log::error!("{}", outcome),
            }
            report.outcomes.push(outcome);
        }

        ctx.teardown();
        Ok(report)
    }
}

impl From<Vec<ScenarioOutcome>> for SuiteReport {
    fn from(outcomes: Vec<ScenarioOutcome>) -> Self {
        SuiteReport { outcomes }
    }
}
