//! `GET /login`, `POST /login` and `POST /logout`.
//!
//! A wrong password re-renders the form with a message. There is no lockout
//! or delay; the user may simply try again.

use axum::{
  Form,
  extract::State,
  http::{StatusCode, header},
  response::{Html, IntoResponse, Redirect, Response},
};
use lineage_chart::ChartRenderer;
use lineage_core::store::RecordStore;
use serde::Deserialize;

use crate::{
  AppState,
  auth::{Authenticated, cleared_cookie, session_cookie, verify_password},
  pages,
};

#[derive(Deserialize)]
pub struct LoginForm {
  #[serde(default)]
  pub password: String,
}

/// `GET /login`
pub async fn form<S, R>(State(state): State<AppState<S, R>>) -> Html<String>
where
  S: RecordStore + 'static,
  R: ChartRenderer + 'static,
{
  Html(pages::login(&state.config.title, None))
}

/// `POST /login`
pub async fn submit<S, R>(
  State(state): State<AppState<S, R>>,
  Form(form): Form<LoginForm>,
) -> Response
where
  S: RecordStore + 'static,
  R: ChartRenderer + 'static,
{
  if verify_password(&form.password, &state.auth).is_err() {
    tracing::warn!("login rejected");
    let page = pages::login(&state.config.title, Some("Incorrect password, please try again."));
    return (StatusCode::UNAUTHORIZED, Html(page)).into_response();
  }

  let token = state.sessions.issue();
  tracing::info!("login accepted");
  ([(header::SET_COOKIE, session_cookie(&token))], Redirect::to("/")).into_response()
}

/// `POST /logout`
pub async fn logout<S, R>(
  State(state): State<AppState<S, R>>,
  session: Authenticated,
) -> Response
where
  S: RecordStore + 'static,
  R: ChartRenderer + 'static,
{
  state.sessions.revoke(&session.token);
  ([(header::SET_COOKIE, cleared_cookie())], Redirect::to("/login")).into_response()
}
