#![allow(clippy::unwrap_used)]
// Request factory and callback-context tests over a recording transport.

mod common;

use std::sync::mpsc;

use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::{Map, Value, json};

use podium_api::{
    DefaultContext, Error, FailureKind, FormBody, Header, HookSlots, Hooks, Outcome, RequestHandle,
    RequestSpec,
};

use common::recording_client;

// ── Helpers ─────────────────────────────────────────────────────────

fn header(pairs: &[(&str, &str)]) -> Header {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn body(pairs: &[(&str, &str)]) -> FormBody {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

fn custom_data() -> Map<String, Value> {
    json!({"custom": "test"}).as_object().unwrap().clone()
}

/// Transformer that records `(handle, raw, data)` and never calls success.
fn recording_transformer(
    tx: mpsc::Sender<(RequestHandle, Value, Map<String, Value>)>,
) -> impl Fn(&RequestHandle, Value, &DefaultContext) -> Result<(), Error> + Send + 'static {
    move |handle: &RequestHandle, raw: Value, ctx: &DefaultContext| {
        tx.send((handle.clone(), raw, ctx.data().clone())).unwrap();
        Ok(())
    }
}

// ── make_request ────────────────────────────────────────────────────

#[test]
fn test_make_request_defaults() {
    let (client, transport) = recording_client();
    let req = client.make_request::<()>(RequestSpec::new("test/test"), Hooks::new(), None);

    assert_eq!(req.url(), "test/test");
    assert_eq!(req.method(), &Method::GET);
    assert_eq!(req.body(), None);
    assert_eq!(req.header(), None);
    assert_eq!(req.hooks(), HookSlots::default());
    assert_eq!(transport.count(), 1);
    assert_eq!(transport.last(), req);
}

#[test]
fn test_make_request_method() {
    let (client, _transport) = recording_client();
    let spec = RequestSpec::new("test/test").with_method(Method::POST);
    let req = client.make_request::<()>(spec, Hooks::new(), None);
    assert_eq!(req.method(), &Method::POST);
}

#[test]
fn test_make_request_headers_carried_exactly() {
    let (client, _transport) = recording_client();
    let spec = RequestSpec::new("test/test").with_header(header(&[("test", "test2")]));
    let req = client.make_request::<()>(spec, Hooks::new(), None);

    assert_eq!(req.url(), "test/test");
    assert_eq!(req.header(), Some(&header(&[("test", "test2")])));
}

#[test]
fn test_make_request_body_is_form_encoded() {
    let (client, _transport) = recording_client();
    let spec = RequestSpec::new("test/test").with_body(body(&[("test", "test2")]));
    let req = client.make_request::<()>(spec, Hooks::new(), None);
    assert_eq!(req.body(), Some("test=test2"));
}

#[test]
fn test_make_request_registers_only_given_slots() {
    let (client, _transport) = recording_client();
    let hooks = Hooks::<()>::new()
        .on_success(|_, _, _| {})
        .on_progress(|_, _, _, _| {});
    let req = client.make_request(RequestSpec::new("test/test"), hooks, None);

    assert_eq!(
        req.hooks(),
        HookSlots {
            success: true,
            progress: true,
            ..HookSlots::default()
        }
    );
}

#[test]
fn test_make_request_callbacks_receive_handle_and_raw() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();

    let cases = [
        (Outcome::Success(json!({})), "success"),
        (Outcome::Failure(FailureKind::Failure, json!({})), "failure"),
        (Outcome::Failure(FailureKind::Error, json!({})), "error"),
        (Outcome::Failure(FailureKind::Redirect, json!({})), "redirect"),
    ];

    for (outcome, expected) in cases {
        let slot = |name: &'static str| {
            let tx = tx.clone();
            move |handle: &RequestHandle, raw: Value, extra: Option<&()>| {
                tx.send((name, handle.clone(), raw, extra.is_some())).unwrap();
            }
        };
        let hooks = Hooks::<()>::new()
            .on_success(slot("success"))
            .on_failure(slot("failure"))
            .on_error(slot("error"))
            .on_redirect(slot("redirect"));
        let req = client.make_request(
            RequestSpec::new("test/test").with_body(body(&[("test", "test2")])),
            hooks,
            None,
        );

        req.complete(outcome).unwrap();

        let (name, handle, raw, had_extra) = rx.try_recv().unwrap();
        assert_eq!(name, expected);
        assert_eq!(handle, req);
        assert_eq!(raw, json!({}));
        assert!(!had_extra);
        assert!(rx.try_recv().is_err(), "{expected}: more than one hook fired");
    }
}

#[test]
fn test_make_request_progress_receives_sizes() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let hooks = Hooks::<()>::new().on_progress(move |handle, current, total, extra| {
        tx.send((handle.id(), current, total, extra.is_some())).unwrap();
    });
    let req = client.make_request(RequestSpec::new("test/test"), hooks, None);

    req.progress(0, Some(10));
    assert_eq!(rx.try_recv().unwrap(), (req.id(), 0, Some(10), false));
}

#[test]
fn test_make_request_forwards_extra_data() {
    let (client, _transport) = recording_client();
    let extra = json!({"test": "testdata"});

    let cases = [
        (Outcome::Success(json!({})), "success"),
        (Outcome::Failure(FailureKind::Failure, json!({})), "failure"),
        (Outcome::Failure(FailureKind::Error, json!({})), "error"),
        (Outcome::Failure(FailureKind::Redirect, json!({})), "redirect"),
    ];

    for (outcome, expected) in cases {
        let (tx, rx) = mpsc::channel();
        let slot = |name: &'static str| {
            let tx = tx.clone();
            move |_: &RequestHandle, _: Value, extra: Option<&Value>| {
                tx.send((name, extra.cloned())).unwrap();
            }
        };
        let progress_tx = tx.clone();
        let hooks = Hooks::<Value>::new()
            .on_success(slot("success"))
            .on_failure(slot("failure"))
            .on_error(slot("error"))
            .on_redirect(slot("redirect"))
            .on_progress(move |_, _, _, extra| {
                progress_tx.send(("progress", extra.cloned())).unwrap();
            });
        let req = client.make_request(
            RequestSpec::new("test/test").with_body(body(&[("test", "test2")])),
            hooks,
            Some(extra.clone()),
        );

        req.progress(0, Some(10));
        req.complete(outcome).unwrap();

        assert_eq!(rx.try_recv().unwrap(), ("progress", Some(extra.clone())));
        assert_eq!(rx.try_recv().unwrap(), (expected, Some(extra.clone())));
        assert!(rx.try_recv().is_err(), "{expected}: more than one hook fired");
    }
}

#[test]
fn test_unset_slot_is_silent() {
    let (client, _transport) = recording_client();
    let req = client.make_request::<()>(RequestSpec::new("test/test"), Hooks::new(), None);
    req.progress(1, None);
    req.complete(Outcome::Success(json!({}))).unwrap();
    assert!(req.is_complete());
}

// ── make_request_default ────────────────────────────────────────────

#[test]
fn test_default_endpoint() {
    let (client, _transport) = recording_client();
    let req = client.make_request_default(RequestSpec::new("test/test"), DefaultContext::new());

    assert_eq!(req.url(), "test/test");
    assert_eq!(req.method(), &Method::GET);
    assert_eq!(req.body(), None);
    assert_eq!(req.header(), None);
}

#[test]
fn test_default_method_header_body() {
    let (client, _transport) = recording_client();
    let spec = RequestSpec::new("test/test")
        .with_method(Method::PUT)
        .with_header(header(&[("test1", "test2")]))
        .with_body(body(&[("test1", "test2")]));
    let req = client.make_request_default(spec, DefaultContext::new());

    assert_eq!(req.method(), &Method::PUT);
    assert_eq!(req.header(), Some(&header(&[("test1", "test2")])));
    assert_eq!(req.body(), Some("test1=test2"));
}

#[test]
fn test_default_success_callback_gets_raw_and_context() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let ctx = DefaultContext::new().on_success(move |raw, ctx| {
        tx.send((
            raw,
            ctx.has_success_callback(),
            ctx.has_failure_callback(),
            ctx.has_progress_callback(),
        ))
        .unwrap();
    });
    let req = client.make_request_default(RequestSpec::new("test/test"), ctx);

    req.complete(Outcome::Success(json!({}))).unwrap();
    assert_eq!(rx.try_recv().unwrap(), (json!({}), true, false, false));
}

#[test]
fn test_default_failure_kinds() {
    let (client, _transport) = recording_client();

    for kind in [FailureKind::Error, FailureKind::Failure, FailureKind::Redirect] {
        let (tx, rx) = mpsc::channel();
        let ctx = DefaultContext::new().on_failure(move |kind, raw, ctx| {
            tx.send((kind.as_str(), raw, ctx.has_failure_callback()))
                .unwrap();
        });
        let req = client.make_request_default(RequestSpec::new("test/test"), ctx);

        req.complete(Outcome::Failure(kind, json!({}))).unwrap();
        assert_eq!(rx.try_recv().unwrap(), (kind.as_str(), json!({}), true));
        assert!(rx.try_recv().is_err());
    }
}

#[test]
fn test_default_progress_callback() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let ctx = DefaultContext::new().on_progress(move |current, total, ctx| {
        tx.send((current, total, ctx.has_progress_callback()))
            .unwrap();
    });
    let req = client.make_request_default(RequestSpec::new("test/test"), ctx);

    req.progress(0, Some(10));
    assert_eq!(rx.try_recv().unwrap(), (0, Some(10), true));
}

#[test]
fn test_default_custom_data_reaches_callback() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let ctx = DefaultContext::new()
        .on_success(move |_, ctx| tx.send(ctx.get("custom").cloned()).unwrap())
        .with_data(custom_data())
        .unwrap();
    let req = client.make_request_default(RequestSpec::new("test/test"), ctx);

    req.complete(Outcome::Success(json!({}))).unwrap();
    assert_eq!(rx.try_recv().unwrap(), Some(json!("test")));
}

#[test]
fn test_default_without_callbacks_is_silent() {
    let (client, _transport) = recording_client();
    let req = client.make_request_default(RequestSpec::new("test/test"), DefaultContext::new());

    assert!(req.hooks().success);
    req.progress(5, None);
    req.complete(Outcome::Failure(FailureKind::Redirect, Value::Null))
        .unwrap();
    assert!(req.is_complete());
}

#[test]
fn test_every_callback_sees_same_context() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let progress_tx = tx.clone();
    let ctx = DefaultContext::new()
        .on_progress(move |_, _, ctx| progress_tx.send(ctx.data().clone()).unwrap())
        .on_failure(move |_, _, ctx| tx.send(ctx.data().clone()).unwrap())
        .with_data(custom_data())
        .unwrap();
    let req = client.make_request_default(RequestSpec::new("test/test"), ctx);

    req.progress(1, Some(2));
    req.complete(Outcome::Failure(FailureKind::Failure, json!({})))
        .unwrap();

    assert_eq!(rx.try_recv().unwrap(), custom_data());
    assert_eq!(rx.try_recv().unwrap(), custom_data());
}

// ── make_request_custom_success ─────────────────────────────────────

#[test]
fn test_custom_success_endpoint() {
    let (client, _transport) = recording_client();
    let (tx, _rx) = mpsc::channel();
    let req = client.make_request_custom_success(
        RequestSpec::new("test/test"),
        recording_transformer(tx),
        DefaultContext::new(),
    );

    assert_eq!(req.url(), "test/test");
    assert_eq!(req.method(), &Method::GET);
    assert_eq!(req.body(), None);
    assert_eq!(req.header(), None);
}

#[test]
fn test_custom_success_method_header_body() {
    let (client, _transport) = recording_client();
    let (tx, _rx) = mpsc::channel();
    let spec = RequestSpec::new("test/test")
        .with_method(Method::PUT)
        .with_header(header(&[("test1", "test2")]))
        .with_body(body(&[("test1", "test2")]));
    let req =
        client.make_request_custom_success(spec, recording_transformer(tx), DefaultContext::new());

    assert_eq!(req.method(), &Method::PUT);
    assert_eq!(req.header(), Some(&header(&[("test1", "test2")])));
    assert_eq!(req.body(), Some("test1=test2"));
}

#[test]
fn test_custom_success_transformer_gets_handle_raw_context() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let ctx = DefaultContext::new().with_data(custom_data()).unwrap();
    let req = client.make_request_custom_success(
        RequestSpec::new("test/test"),
        recording_transformer(tx),
        ctx,
    );

    req.complete(Outcome::Success(json!({}))).unwrap();

    let (handle, raw, data) = rx.try_recv().unwrap();
    assert_eq!(handle, req);
    assert_eq!(raw, json!({}));
    assert_eq!(data, custom_data());
}

#[test]
fn test_custom_success_transformer_decides_success() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let ctx = DefaultContext::new().on_success(move |raw, _| tx.send(raw).unwrap());
    let transformer = |_: &RequestHandle, raw: Value, ctx: &DefaultContext| -> Result<(), Error> {
        ctx.notify_success(raw["lap"].clone());
        Ok(())
    };
    let req = client.make_request_custom_success(RequestSpec::new("u"), transformer, ctx);

    req.complete(Outcome::Success(json!({"lap": 4}))).unwrap();
    assert_eq!(rx.try_recv().unwrap(), json!(4));
}

#[test]
fn test_custom_success_failure_and_progress() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let (fail_tx, _) = mpsc::channel();
    let progress_tx = tx.clone();
    let ctx = DefaultContext::new()
        .on_failure(move |kind, _, _| tx.send(kind.to_string()).unwrap())
        .on_progress(move |current, total, _| {
            progress_tx.send(format!("{current}/{total:?}")).unwrap();
        });
    let req = client.make_request_custom_success(
        RequestSpec::new("test/test"),
        recording_transformer(fail_tx),
        ctx,
    );

    req.progress(0, Some(10));
    req.complete(Outcome::Failure(FailureKind::Error, json!({})))
        .unwrap();

    assert_eq!(rx.try_recv().unwrap(), "0/Some(10)");
    assert_eq!(rx.try_recv().unwrap(), "error");
}

#[test]
fn test_custom_success_transformer_error_reaches_failure() {
    let (client, _transport) = recording_client();
    let (tx, rx) = mpsc::channel();
    let success_tx = tx.clone();
    let ctx = DefaultContext::new()
        .on_success(move |_, _| success_tx.send(("success", Value::Null)).unwrap())
        .on_failure(move |kind, raw, _| tx.send((kind.as_str(), raw)).unwrap());
    let transformer = |_: &RequestHandle, raw: Value, _: &DefaultContext| -> Result<(), Error> {
        Err(Error::MalformedResponse {
            message: "missing field `lap`".into(),
            body: raw.to_string(),
        })
    };
    let req = client.make_request_custom_success(RequestSpec::new("u"), transformer, ctx);

    let err = req.complete(Outcome::Success(json!({"car": 7}))).unwrap_err();
    assert!(err.is_malformed_response());

    let (kind, raw) = rx.try_recv().unwrap();
    assert_eq!(kind, "error");
    assert_eq!(raw, json!({"error": err.to_string(), "body": {"car": 7}}));
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_reserved_data_key_is_rejected() {
    let data = json!({"failure_callback": 1}).as_object().unwrap().clone();
    let err = DefaultContext::new().with_data(data).unwrap_err();
    assert!(matches!(err, Error::ReservedContextKey(ref key) if key == "failure_callback"));
}
