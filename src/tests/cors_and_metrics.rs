// Peripheral routes: health, policy, CORS preflight and the metrics scrape.

#[cfg(test)]
mod test {
    use chrono::Utc;
    use http::header::{
        ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN,
        ACCESS_CONTROL_REQUEST_HEADERS, ACCESS_CONTROL_REQUEST_METHOD, ORIGIN,
    };
    use http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::tests::common::{build_reqwest_client, closed_port_url, spawn_bridge, test_config};

    #[tokio::test]
    async fn healthz_reports_service_and_time() {
        let (handle, addr) = spawn_bridge(test_config(&closed_port_url().await, false, 1.0)).await;

        let res = build_reqwest_client()
            .get(format!("http://{}/healthz", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let body: Value = res.json().await.unwrap();
        assert_eq!(body["ok"], true);
        assert_eq!(body["service"], "voiceops-bridge-api");
        let time = body["time"].as_i64().unwrap();
        assert!((Utc::now().timestamp() - time).abs() <= 5);

        handle.abort();
    }

    #[tokio::test]
    async fn policy_serves_static_action_lists() {
        let (handle, addr) = spawn_bridge(test_config(&closed_port_url().await, false, 1.0)).await;

        let body: Value = build_reqwest_client()
            .get(format!("http://{}/api/policy", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(
            body,
            json!({
                "allowed_agent_actions": ["navigate", "open_runbook", "show_checklist", "draft_update"],
                "requires_confirmation": ["notify_stakeholders", "create_ticket", "page_oncall"],
                "max_action_payload_bytes": 8192
            })
        );

        handle.abort();
    }

    #[tokio::test]
    async fn preflight_from_allowed_origin_is_accepted_with_credentials() {
        let (handle, addr) = spawn_bridge(test_config(&closed_port_url().await, true, 1.0)).await;

        let res = build_reqwest_client()
            .request(Method::OPTIONS, format!("http://{}/api/voice-token", addr))
            .header(ORIGIN, "http://localhost:5173")
            .header(ACCESS_CONTROL_REQUEST_METHOD, "GET")
            .header(ACCESS_CONTROL_REQUEST_HEADERS, "x-trace-id")
            .send()
            .await
            .unwrap();

        assert!(res.status().is_success());
        assert_eq!(
            res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");

        handle.abort();
    }

    #[tokio::test]
    async fn unknown_origin_gets_no_cors_grant() {
        let (handle, addr) = spawn_bridge(test_config(&closed_port_url().await, true, 1.0)).await;

        let res = build_reqwest_client()
            .get(format!("http://{}/healthz", addr))
            .header(ORIGIN, "http://evil.test")
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn metrics_route_exposes_token_outcomes_when_enabled() {
        let mut config = test_config(&closed_port_url().await, false, 1.0);
        config.settings.metrics.is_enabled = true;
        let (handle, addr) = spawn_bridge(config).await;
        let client = build_reqwest_client();

        // missing key: counted as an outcome without any upstream traffic
        let res = client
            .get(format!("http://{}/api/voice-token", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let res = client
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let text = res.text().await.unwrap();
        assert!(
            text.contains("voiceops_token_requests_total{outcome=\"missing_secret\"}"),
            "{text}"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn metrics_route_is_absent_when_disabled() {
        let (handle, addr) = spawn_bridge(test_config(&closed_port_url().await, false, 1.0)).await;

        let res = build_reqwest_client()
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        handle.abort();
    }
}
