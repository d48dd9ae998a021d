//! Page object for the Outcomes page: one method per user action, each going
//! through the same endpoints the page's own UI calls.

use anyhow::{anyhow, bail, Result};
use common::{EditorView, OutcomesTable, ReorderPayload, SaveResponse, TextPayload};
use outcomes::{ChoiceId, OutcomeId};
use playwright::api::{response::Response, Page};

use crate::{
    playwright_ext::{PageFetchExt, ResponseJsonExt},
    Context,
};

pub struct OutcomesPage<'a> {
    page: &'a Page,
    base_url: &'a str,
}

impl<'a> OutcomesPage<'a> {
    pub fn new(ctx: &'a Context) -> Self {
        OutcomesPage {
            page: &ctx.page,
            base_url: &ctx.base_url,
        }
    }

    /// Opens the page on an empty store.
    pub async fn navigate_to_outcomes(&self) -> Result<()> {
        self.page.goto_builder(self.base_url).goto().await?;
        let response = self.page.post_empty("/outcomes/reset").await?;
        if response.status()? != 204 {
            bail!("resetting outcomes failed with {}", response.status()?);
        }
        Ok(())
    }

    pub async fn title(&self) -> Result<String> {
        Ok(self.page.inner_text("body", None).await?)
    }

    pub async fn outcomes_table(&self) -> Result<OutcomesTable> {
        self.page.get("/outcomes").await?.parse_json().await
    }

    pub async fn outcome_names(&self) -> Result<Vec<String>> {
        Ok(self
            .outcomes_table()
            .await?
            .rows
            .into_iter()
            .map(|row| row.output_type)
            .collect())
    }

    pub async fn drawer(&self) -> Result<EditorView> {
        expect_view(self.page.get("/editor").await?).await
    }

    pub async fn output_order(&self) -> Result<Vec<String>> {
        Ok(self
            .drawer()
            .await?
            .choice_texts()
            .into_iter()
            .map(str::to_string)
            .collect())
    }

    pub async fn click_create_outcome_button(&self) -> Result<EditorView> {
        expect_view(self.page.post_empty("/editor/create").await?).await
    }

    pub async fn enter_outcome_name(&self, name: &str) -> Result<EditorView> {
        expect_view(self.page.put("/editor/name", TextPayload::new(name)).await?).await
    }

    pub async fn clear_outcome_name(&self) -> Result<EditorView> {
        self.enter_outcome_name("").await
    }

    pub async fn click_add_value_button(&self) -> Result<EditorView> {
        expect_view(self.page.post_empty("/editor/choices").await?).await
    }

    pub async fn enter_value(&self, text: &str) -> Result<EditorView> {
        expect_view(self.page.put("/editor/pending", TextPayload::new(text)).await?).await
    }

    pub async fn click_value_confirm_button(&self) -> Result<EditorView> {
        expect_view(self.page.post_empty("/editor/pending/confirm").await?).await
    }

    pub async fn click_value_cancel_button(&self) -> Result<EditorView> {
        expect_view(self.page.delete("/editor/pending").await?).await
    }

    pub async fn add_value(&self, text: &str) -> Result<EditorView> {
        self.click_add_value_button().await?;
        self.enter_value(text).await?;
        self.click_value_confirm_button().await
    }

    pub async fn click_edit_button_for_output(&self, text: &str) -> Result<EditorView> {
        let id = self.choice_id(text).await?;
        expect_view(
            self.page
                .post_empty(&format!("/editor/choices/{}/edit", id))
                .await?,
        )
        .await
    }

    pub async fn click_delete_button_for_output(&self, text: &str) -> Result<EditorView> {
        let id = self.choice_id(text).await?;
        expect_view(self.page.delete(&format!("/editor/choices/{}", id)).await?).await
    }

    pub async fn drag_and_drop_output(&self, source: &str, target: &str) -> Result<EditorView> {
        let source = self.choice_id(source).await?;
        let before = self.choice_id(target).await?;
        expect_view(
            self.page
                .post(
                    &format!("/editor/choices/{}/move", source),
                    ReorderPayload { before },
                )
                .await?,
        )
        .await
    }

    /// Clicks save; a rejected save is a normal outcome, not an error.
    pub async fn click_save_button(&self) -> Result<SaveResponse> {
        let response = self.page.post_empty("/editor/save").await?;
        match response.status()? {
            200 | 422 => response.parse_json().await,
            status => bail!("save failed with {}: {}", status, response.text().await?),
        }
    }

    pub async fn click_cancel_button(&self) -> Result<EditorView> {
        expect_view(self.page.post_empty("/editor/cancel").await?).await
    }

    pub async fn click_on_outcome_in_list(&self, name: &str) -> Result<EditorView> {
        let id = self.outcome_id(name).await?;
        expect_view(self.page.post_empty(&format!("/editor/view/{}", id)).await?).await
    }

    pub async fn click_edit_button_in_drawer(&self) -> Result<EditorView> {
        expect_view(self.page.post_empty("/editor/edit").await?).await
    }

    pub async fn click_edit_action_in_table(&self, name: &str) -> Result<EditorView> {
        let id = self.outcome_id(name).await?;
        expect_view(self.page.post_empty(&format!("/editor/edit/{}", id)).await?).await
    }

    pub async fn click_delete_action_in_table(&self, name: &str) -> Result<EditorView> {
        let id = self.outcome_id(name).await?;
        expect_view(self.page.post_empty(&format!("/editor/delete/{}", id)).await?).await
    }

    pub async fn click_delete_popup_cancel_button(&self) -> Result<EditorView> {
        expect_view(self.page.delete("/editor/delete").await?).await
    }

    pub async fn click_delete_popup_delete_button(&self) -> Result<EditorView> {
        let id = self
            .drawer()
            .await?
            .delete_dialog
            .map(|dialog| dialog.outcome_id)
            .ok_or_else(|| anyhow!("delete popup is not open"))?;
        expect_view(
            self.page
                .post_empty(&format!("/editor/delete/{}/confirm", id))
                .await?,
        )
        .await
    }

    /// Create drawer, name, save. Fails unless the outcome lands in the table.
    pub async fn create_outcome(&self, name: &str) -> Result<()> {
        self.click_create_outcome_button().await?;
        self.enter_outcome_name(name).await?;
        match self.click_save_button().await? {
            SaveResponse::Saved { .. } => Ok(()),
            SaveResponse::Rejected { errors, .. } => {
                bail!("creating {:?} was rejected: {:?}", name, errors)
            }
        }
    }

    async fn choice_id(&self, text: &str) -> Result<ChoiceId> {
        self.drawer()
            .await?
            .choice_id(text)
            .ok_or_else(|| anyhow!("no output choice {:?} in the drawer", text))
    }

    async fn outcome_id(&self, name: &str) -> Result<OutcomeId> {
        self.outcomes_table()
            .await?
            .row(name)
            .map(|row| row.id)
            .ok_or_else(|| anyhow!("no outcome {:?} in the table", name))
    }
}

async fn expect_view(response: Response) -> Result<EditorView> {
    let status = response.status()?;
    if status != 200 {
        bail!("unexpected status {}: {}", status, response.text().await?);
    }
    response.parse_json().await
}
