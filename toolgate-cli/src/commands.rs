use anyhow::{Context, Result, bail};
use serde_json::{Map, Value, json};
use toolgate_adapter::OutputAdapter;
use toolgate_events::{EventSink, emit_gate_decision};
use toolgate_idempotency::{
    IdempotencyInput, derive_idempotency_key, operation_fingerprint, plan_idempotency,
    ttl_seconds_for_risk_tier,
};
use toolgate_policy::{FeatureFlags, GateRequest, PolicyGateEngine, ToolArgs, assess_tool};

fn parse_json_arg(raw: Option<&str>, what: &str) -> Result<Value> {
    match raw {
        None => Ok(Value::Object(Map::new())),
        Some(raw) => serde_json::from_str(raw).with_context(|| format!("invalid JSON for {what}")),
    }
}

fn parse_object_arg(raw: Option<&str>, what: &str) -> Result<Map<String, Value>> {
    match parse_json_arg(raw, what)? {
        Value::Object(map) => Ok(map),
        other => bail!("{what} must be a JSON object, got {other}"),
    }
}

pub struct GateArgs<'a> {
    pub tool: &'a str,
    pub args: Option<&'a str>,
    pub run_id: &'a str,
    pub root_session_id: &'a str,
    pub invocation_id: &'a str,
}

/// Gate decision plus, for mutating calls, the idempotency hint. The
/// decision is recorded on `sink` either way.
pub fn gate(
    flags: &FeatureFlags,
    engine: &PolicyGateEngine,
    sink: &dyn EventSink,
    args: &GateArgs<'_>,
) -> Result<Value> {
    let tool_args_value = Value::Object(parse_object_arg(args.args, "--args")?);
    let tool_args = ToolArgs::from_value(tool_args_value.clone());

    let decision = engine.evaluate(
        flags,
        &GateRequest {
            tool_name: args.tool,
            tool_args: &tool_args,
            run_id: args.run_id,
            root_session_id: args.root_session_id,
            invocation_id: args.invocation_id,
        },
    );
    emit_gate_decision(sink, &decision);

    let input = IdempotencyInput::new(
        args.root_session_id,
        args.invocation_id,
        operation_fingerprint(args.tool, &tool_args),
        tool_args_value,
    );
    let hint = plan_idempotency(flags, assess_tool(args.tool, &tool_args), &input)?;

    Ok(json!({
        "gate": decision.to_payload(),
        "idempotency": hint,
    }))
}

pub fn classify(text: &str) -> Value {
    let adapter = OutputAdapter::new();
    json!({
        "shape": adapter.classify(text),
        "fallback_to_plain": adapter.should_fallback_to_plain(text),
        "tool_request": adapter.extract_tool_request(text),
    })
}

pub fn idem_key(
    root_session_id: &str,
    invocation_id: &str,
    fingerprint: Option<&str>,
    payload: Option<&str>,
    risk_tier: Option<&str>,
) -> Result<Value> {
    let input = IdempotencyInput::new(
        root_session_id,
        invocation_id,
        parse_object_arg(fingerprint, "--fingerprint")?,
        parse_json_arg(payload, "--payload")?,
    );
    let key = derive_idempotency_key(&input)?;
    Ok(json!({
        "key": key,
        "ttl_seconds": ttl_seconds_for_risk_tier(risk_tier.unwrap_or_default()),
    }))
}

pub fn flags(flags: &FeatureFlags) -> Result<Value> {
    Ok(serde_json::to_value(flags)?)
}
