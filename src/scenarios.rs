//! The seven Story Spoiler scenarios, in the order they must run.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use reqwest::StatusCode;

use crate::client::{expect_message, ApiResponse};
use crate::error::{HarnessError, Result};
use crate::models::{CreatedStory, DeletedStory, EditedStory, StoryPayload, StorySummary};
use crate::runner::SuiteContext;
use crate::settings::FixtureMode;

pub const CREATED_MSG: &str = "Successfully created!";
pub const EDITED_MSG: &str = "Successfully edited";
pub const DELETED_MSG: &str = "Deleted successfully!";
pub const NOT_FOUND_MSG: &str = "No spoilers...";
pub const DELETE_FAILED_MSG: &str = "Unable to delete this story spoiler!";

/// Id that no story on the server ever has.
pub const MISSING_STORY_ID: &str = "NonExistingQP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Create,
    List,
    Edit,
    Delete,
    CreateInvalid,
    EditMissing,
    DeleteMissing,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::Create,
        Scenario::List,
        Scenario::Edit,
        Scenario::Delete,
        Scenario::CreateInvalid,
        Scenario::EditMissing,
        Scenario::DeleteMissing,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::Create => "create",
            Scenario::List => "list",
            Scenario::Edit => "edit",
            Scenario::Delete => "delete",
            Scenario::CreateInvalid => "create-invalid",
            Scenario::EditMissing => "edit-nonexistent",
            Scenario::DeleteMissing => "delete-nonexistent",
        }
    }

    /// Whether this scenario reads the id captured by `List` in shared fixture mode.
    pub fn needs_shared_id(self) -> bool {
        matches!(self, Scenario::Edit | Scenario::Delete)
    }

    pub async fn run(self, ctx: &mut SuiteContext) -> Result<()> {
        match self {
            Scenario::Create => {
                let story = StoryPayload::new("Test title", "Test description");
                let response = ctx.api.create(&story).await?;
                let result = check_created(&response);
                if ctx.fixture_mode == FixtureMode::Isolated {
                    if let Some(id) = echoed_id(&response) {
                        remove_fixture(ctx, &id).await;
                    }
                }
                result
            }
            Scenario::List => list_stories(ctx).await,
            Scenario::Edit => {
                let (id, fixture) = target_story(ctx, self).await?;
                let result = edit_story(ctx, &id).await;
                if fixture {
                    remove_fixture(ctx, &id).await;
                }
                result
            }
            Scenario::Delete => {
                let (id, fixture) = target_story(ctx, self).await?;
                let result = delete_story(ctx, &id).await;
                if fixture && result.is_err() {
                    remove_fixture(ctx, &id).await;
                }
                result
            }
            Scenario::CreateInvalid => create_invalid_story(ctx).await,
            Scenario::EditMissing => edit_missing_story(ctx).await,
            Scenario::DeleteMissing => delete_missing_story(ctx).await,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Scenario {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| HarnessError::Config(format!("unknown scenario {:?}", s)))
    }
}

fn check_created(response: &ApiResponse) -> Result<()> {
    response.expect_status(StatusCode::CREATED)?;
    let created: CreatedStory = response.json()?;
    expect_message(&created, CREATED_MSG)
}

/// The id of a story the server reports as created, whatever its message says.
fn echoed_id(response: &ApiResponse) -> Option<String> {
    if response.status != StatusCode::CREATED {
        return None;
    }
    response
        .json::<CreatedStory>()
        .ok()?
        .id
        .filter(|id| !id.is_empty())
}

async fn list_stories(ctx: &mut SuiteContext) -> Result<()> {
    let response = ctx.api.list().await?;
    response.expect_status(StatusCode::OK)?;
    let stories: Vec<StorySummary> = response.json_list()?;

    let last = stories.last().ok_or(HarnessError::EmptyList)?;
    ctx.state.last_story_id = last.id.clone();
    log::info!("Captured story id {:?}", ctx.state.last_story_id);
    Ok(())
}

async fn edit_story(ctx: &mut SuiteContext, id: &str) -> Result<()> {
    let story = StoryPayload::new("Edited title", "Edited description");
    let response = ctx.api.edit(id, &story).await?;
    response.expect_status(StatusCode::OK)?;
    let edited: EditedStory = response.json()?;
    expect_message(&edited, EDITED_MSG)
}

async fn delete_story(ctx: &mut SuiteContext, id: &str) -> Result<()> {
    let response = ctx.api.delete(id).await?;
    response.expect_status(StatusCode::OK)?;
    let deleted: DeletedStory = response.json()?;
    expect_message(&deleted, DELETED_MSG)
}

async fn create_invalid_story(ctx: &mut SuiteContext) -> Result<()> {
    let response = ctx.api.create(&StoryPayload::empty()).await?;
    response.expect_status(StatusCode::BAD_REQUEST)?;
    Ok(())
}

async fn edit_missing_story(ctx: &mut SuiteContext) -> Result<()> {
    let story = StoryPayload::new("New", "new");
    let response = ctx.api.edit(MISSING_STORY_ID, &story).await?;
    response.expect_status(StatusCode::NOT_FOUND)?;
    let edited: EditedStory = response.json()?;
    expect_message(&edited, NOT_FOUND_MSG)
}

async fn delete_missing_story(ctx: &mut SuiteContext) -> Result<()> {
    let response = ctx.api.delete(MISSING_STORY_ID).await?;
    response.expect_status(StatusCode::BAD_REQUEST)?;
    let deleted: DeletedStory = response.json()?;
    expect_message(&deleted, DELETE_FAILED_MSG)
}

/// Picks the story a state-dependent scenario works on. The flag is true when the
/// story is a fixture this scenario created and is responsible for.
async fn target_story(ctx: &mut SuiteContext, scenario: Scenario) -> Result<(String, bool)> {
    match ctx.fixture_mode {
        FixtureMode::Shared => Ok((ctx.shared_story_id(), false)),
        FixtureMode::Isolated => Ok((create_fixture(ctx, scenario).await?, true)),
    }
}

async fn create_fixture(ctx: &mut SuiteContext, scenario: Scenario) -> Result<String> {
    let title = format!("Fixture for {} {}", scenario, Utc::now().timestamp_millis());
    let story = StoryPayload::new(title.as_str(), "Fixture description");

    let response = ctx.api.create(&story).await?;
    response.expect_status(StatusCode::CREATED)?;
    let created: CreatedStory = response.json()?;
    if let Some(id) = created.id.filter(|id| !id.is_empty()) {
        log::debug!("Fixture {} created for {}", id, scenario);
        return Ok(id);
    }

    // Create did not echo the id; only a story carrying our unique title is ours.
    let response = ctx.api.list().await?;
    response.expect_status(StatusCode::OK)?;
    let stories: Vec<StorySummary> = response.json_list()?;
    let id = stories
        .iter()
        .rev()
        .find(|s| s.title.as_deref() == Some(title.as_str()))
        .and_then(|s| s.id.clone())
        .ok_or_else(|| HarnessError::FixtureNotFound(title.clone()))?;
    log::debug!("Fixture {} resolved from listing for {}", id, scenario);
    Ok(id)
}

async fn remove_fixture(ctx: &mut SuiteContext, id: &str) {
    match ctx.api.delete(id).await {
        Ok(response) if response.status.is_success() => log::debug!("Fixture {} removed", id),
        Ok(response) => log::warn!("Fixture {} not removed: status {}", id, response.status),
        Err(e) => log::warn!("Fixture {} not removed: {}", id, e),
    }
}
