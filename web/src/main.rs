#[macro_use]
extern crate rocket;

mod api;
mod editors;

use std::sync::Arc;

use outcomes::OutcomeStore;
use rocket::{fairing::AdHoc, Build, Rocket};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::{api::WebConfig, editors::Editors};

fn rocket() -> Rocket<Build> {
    rocket::build()
        .manage(Editors::new(Arc::new(OutcomeStore::new())))
        .attach(AdHoc::config::<WebConfig>())
        .mount(
            "/",
            routes![
                api::index,
                api::outcomes_list,
                api::outcome,
                api::reset,
                api::editor,
                api::open_for_create,
                api::open_for_view,
                api::open_for_edit,
                api::switch_to_edit,
                api::set_name,
                api::begin_add_choice,
                api::begin_edit_choice,
                api::delete_choice,
                api::reorder,
                api::set_pending_text,
                api::confirm_pending_choice,
                api::cancel_pending_choice,
                api::attempt_save,
                api::cancel,
                api::request_delete,
                api::confirm_delete,
                api::cancel_delete,
            ],
        )
}

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let _rocket = rocket().launch().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::rocket;
    use crate::editors::CLIENT_COOKIE;
    use common::{EditorView, ErrorBody, OutcomesTable, ReorderPayload, SaveResponse, TextPayload};
    use outcomes::{Mode, ValidationError};
    use rocket::{
        http::{Cookie, Status},
        local::blocking::{Client, LocalResponse},
    };

    fn client() -> Client {
        Client::tracked(rocket()).expect("valid rocket instance")
    }

    fn view(response: LocalResponse<'_>) -> EditorView {
        assert_eq!(response.status(), Status::Ok);
        response.into_json().expect("editor view body")
    }

    fn open_named(client: &Client, name: &str) -> EditorView {
        view(client.post("/editor/create").dispatch());
        view(client.put("/editor/name").json(&TextPayload::new(name)).dispatch())
    }

    fn save(client: &Client) -> (Status, SaveResponse) {
        let response = client.post("/editor/save").dispatch();
        let status = response.status();
        (status, response.into_json().expect("save body"))
    }

    fn table(client: &Client) -> OutcomesTable {
        client
            .get("/outcomes")
            .dispatch()
            .into_json()
            .expect("outcomes table")
    }

    #[test]
    fn index_assigns_a_client_cookie() {
        let client = client();
        let response = client.get("/").dispatch();
        assert_eq!(response.status(), Status::Ok);
        assert!(response.cookies().get(CLIENT_COOKIE).is_some());
        assert_eq!(response.into_string().as_deref(), Some("Outcomes"));
    }

    #[test]
    fn list_page_has_its_columns() {
        let client = client();
        let table = table(&client);
        assert_eq!(table.title, "Outcomes");
        assert_eq!(
            table.columns,
            vec!["Output type", "Output choice", "Date Created", "Updated at", "Actions"]
        );
        assert!(table.rows.is_empty());
    }

    #[test]
    fn create_with_an_added_value() {
        let client = client();
        let opened = open_named(&client, "Test Outcome");
        assert_eq!(opened.mode, Mode::Creating);
        assert_eq!(opened.choice_texts(), vec!["Route to labs", "Refer to UW", "Offer"]);
        assert!(opened.feedback.save_enabled);

        let adding = view(client.post("/editor/choices").dispatch());
        assert!(adding.pending_choice_edit.is_some());
        view(
            client
                .put("/editor/pending")
                .json(&TextPayload::new("Custom Output Value"))
                .dispatch(),
        );
        let added = view(client.post("/editor/pending/confirm").dispatch());
        assert_eq!(added.draft_choices.len(), 4);

        let (status, response) = save(&client);
        assert_eq!(status, Status::Ok);
        let outcome = match response {
            SaveResponse::Saved { outcome } => outcome,
            other => panic!("unexpected save response: {:?}", other),
        };
        assert_eq!(outcome.choice_texts().last(), Some(&"Custom Output Value"));

        let closed = view(client.get("/editor").dispatch());
        assert!(!closed.is_open());
        let listed = table(&client);
        let row = listed.row("Test Outcome").expect("row for the new outcome");
        assert_eq!(
            row.output_choice,
            "Route to labs, Refer to UW, Offer, Custom Output Value"
        );
    }

    #[test]
    fn duplicate_name_is_unprocessable() {
        let client = client();
        open_named(&client, "Duplicate Test Outcome");
        assert_eq!(save(&client).0, Status::Ok);

        let reopened = open_named(&client, "Duplicate Test Outcome");
        assert!(!reopened.feedback.save_enabled);
        let (status, response) = save(&client);
        assert_eq!(status, Status::UnprocessableEntity);
        match response {
            SaveResponse::Rejected { errors, feedback } => {
                assert!(errors.contains(ValidationError::DuplicateName));
                assert!(feedback.name_error.unwrap().contains("already exists"));
                assert!(feedback.banner.is_some());
            }
            other => panic!("unexpected save response: {:?}", other),
        }
        assert!(view(client.get("/editor").dispatch()).is_open());
        assert_eq!(table(&client).rows.len(), 1);
    }

    #[test]
    fn drag_and_drop_reorders_the_draft() {
        let client = client();
        let opened = open_named(&client, "Test Outcome for Drag Drop");
        let refer = opened.choice_id("Refer to UW").unwrap();
        let route = opened.choice_id("Route to labs").unwrap();

        let moved = view(
            client
                .post(format!("/editor/choices/{}/move", refer))
                .json(&ReorderPayload { before: route })
                .dispatch(),
        );
        assert_eq!(moved.choice_texts(), vec!["Refer to UW", "Route to labs", "Offer"]);
    }

    #[test]
    fn edit_from_the_table_and_clear_the_name() {
        let client = client();
        open_named(&client, "Test Outcome for Empty Name Validation");
        let outcome = match save(&client).1 {
            SaveResponse::Saved { outcome } => outcome,
            other => panic!("unexpected save response: {:?}", other),
        };

        let editing = view(client.post(format!("/editor/edit/{}", outcome.id)).dispatch());
        assert_eq!(editing.mode, Mode::Editing);
        assert_eq!(editing.draft_name, outcome.name);

        view(client.put("/editor/name").json(&TextPayload::new("")).dispatch());
        let (status, response) = save(&client);
        assert_eq!(status, Status::UnprocessableEntity);
        match response {
            SaveResponse::Rejected { feedback, .. } => {
                assert_eq!(feedback.name_error.as_deref(), Some("This is required"));
            }
            other => panic!("unexpected save response: {:?}", other),
        }
    }

    #[test]
    fn misuse_is_a_conflict_and_unknown_ids_are_not_found() {
        let client = client();
        let response = client.post("/editor/edit").dispatch();
        assert_eq!(response.status(), Status::Conflict);
        let body: ErrorBody = response.into_json().unwrap();
        assert!(body.error.contains("switch_to_edit"));

        let missing = outcomes::OutcomeId::new();
        let response = client.post(format!("/editor/view/{}", missing)).dispatch();
        assert_eq!(response.status(), Status::NotFound);

        let response = client.post("/editor/view/not-an-id").dispatch();
        assert_eq!(response.status(), Status::BadRequest);
    }

    #[test]
    fn delete_dialog_cancel_then_delete() {
        let client = client();
        open_named(&client, "Test Outcome for Deletion");
        save(&client);
        let id = table(&client).rows[0].id;

        let dialog = view(client.post(format!("/editor/delete/{}", id)).dispatch())
            .delete_dialog
            .expect("delete dialog");
        assert_eq!(dialog.title, "Delete outcome");
        assert_eq!(dialog.prompt, "Are you sure you want to delete this outcome?");

        let cancelled = view(client.delete("/editor/delete").dispatch());
        assert!(cancelled.delete_dialog.is_none());
        assert_eq!(table(&client).rows.len(), 1);

        view(client.post(format!("/editor/delete/{}", id)).dispatch());
        view(client.post(format!("/editor/delete/{}/confirm", id)).dispatch());
        assert!(table(&client).rows.is_empty());
    }

    #[test]
    fn sessions_are_per_client() {
        let client = Client::untracked(rocket()).expect("valid rocket instance");
        let first = Cookie::new(CLIENT_COOKIE, "first");
        let second = Cookie::new(CLIENT_COOKIE, "second");

        view(client.post("/editor/create").cookie(first.clone()).dispatch());

        assert!(view(client.get("/editor").cookie(first).dispatch()).is_open());
        assert!(!view(client.get("/editor").cookie(second).dispatch()).is_open());
    }

    #[test]
    fn reset_clears_every_outcome() {
        let client = client();
        open_named(&client, "Temporary");
        save(&client);
        assert_eq!(
            client.post("/outcomes/reset").dispatch().status(),
            Status::NoContent
        );
        assert!(table(&client).rows.is_empty());
    }
}
