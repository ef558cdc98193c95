use chrono::{TimeZone, Utc};
use kubecred::credentials::{CommandRunner, HelperOutput, TokenRefresher};
use kubecred::{Authenticator, KubeConfig, KubeConfigError, RequestOptions};
use std::io;
use std::sync::{Arc, Mutex};

const PROVIDER_CONFIG: &str = r#"
apiVersion: v1
clusters:
- name: gke
  cluster:
    server: https://35.0.0.1
users:
- name: gke-user
  user:
    auth-provider:
      name: gcp
      config:
        access-token: stale-token
        cmd-path: /usr/lib/google-cloud-sdk/bin/gcloud
        cmd-args: config config-helper --format=json
        expiry: "2018-03-01T12:00:00Z"
        expiry-key: "{.credential.token_expiry}"
        token-key: "{.credential.access_token}"
contexts:
- name: gke
  context:
    cluster: gke
    user: gke-user
current-context: gke
"#;

struct ScriptedRunner {
    output: HelperOutput,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    fn new(code: i32, stdout: &str) -> Arc<Self> {
        Arc::new(Self {
            output: HelperOutput {
                code: Some(code),
                stdout: stdout.to_string(),
                stderr: String::new(),
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, command: &str) -> io::Result<HelperOutput> {
        self.calls.lock().unwrap().push(command.to_string());
        Ok(self.output.clone())
    }
}

fn load(runner: &Arc<ScriptedRunner>, hour: u32) -> KubeConfig {
    let now = Utc.with_ymd_and_hms(2018, 3, 1, hour, 0, 0).unwrap();
    KubeConfig::load_from_str(PROVIDER_CONFIG)
        .unwrap()
        .with_refresher(
            TokenRefresher::default()
                .with_runner(runner.clone())
                .with_clock(move || now),
        )
}

fn stored_token(kc: &KubeConfig) -> Option<String> {
    kc.current_user()
        .unwrap()
        .auth_provider
        .as_ref()
        .and_then(|p| p.config.as_ref())
        .and_then(|c| c.access_token.clone())
}

#[test]
fn test_valid_token_is_used_without_helper() {
    let runner = ScriptedRunner::new(0, "{}");
    let mut kc = load(&runner, 12);
    let mut opts = RequestOptions::default();

    kc.apply_to_request(&mut opts).unwrap();

    assert_eq!(opts.authorization(), Some("Bearer stale-token"));
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn test_expired_token_is_refreshed_into_request() {
    let runner = ScriptedRunner::new(
        0,
        r#"{"credential": {"access_token": "fresh-token", "token_expiry": "2018-03-01T14:00:00Z"}}"#,
    );
    let mut kc = load(&runner, 13);
    let mut opts = RequestOptions::default();

    kc.apply_to_request(&mut opts).unwrap();

    assert_eq!(opts.authorization(), Some("Bearer fresh-token"));
    assert_eq!(stored_token(&kc).as_deref(), Some("fresh-token"));
    assert_eq!(
        runner.calls.lock().unwrap().clone(),
        vec!["/usr/lib/google-cloud-sdk/bin/gcloud config config-helper --format=json".to_string()]
    );
}

#[test]
fn test_helper_failure_propagates() {
    let runner = ScriptedRunner::new(1, "ERROR: (gcloud.config.config-helper) reauth required");
    let mut kc = load(&runner, 13);
    let mut opts = RequestOptions::default();

    let err = kc.apply_to_request(&mut opts).unwrap_err();

    match err {
        KubeConfigError::RefreshCommand { output, .. } => {
            assert!(output.contains("reauth required"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(stored_token(&kc).as_deref(), Some("stale-token"));
    assert!(opts.authorization().is_none());
}

#[test]
fn test_static_user_token_overrides_provider() {
    let runner = ScriptedRunner::new(0, r#"{"credential": {"access_token": "fresh-token"}}"#);
    let yaml = PROVIDER_CONFIG.replace(
        "    auth-provider:",
        "    token: static-token\n    auth-provider:",
    );
    let now = Utc.with_ymd_and_hms(2018, 3, 1, 13, 0, 0).unwrap();
    let mut kc = KubeConfig::load_from_str(&yaml).unwrap().with_refresher(
        TokenRefresher::default()
            .with_runner(runner.clone())
            .with_clock(move || now),
    );

    assert_eq!(
        kc.authorization_token().unwrap().as_deref(),
        Some("Bearer static-token")
    );
}

#[cfg(unix)]
#[test]
fn test_real_helper_script() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("helper.sh");
    std::fs::write(
        &script,
        "#!/bin/sh\nprintf '{\"status\": {\"token\": \"%s\"}}' \"$1\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let yaml = PROVIDER_CONFIG
        .replace("/usr/lib/google-cloud-sdk/bin/gcloud", script.to_str().unwrap())
        .replace("config config-helper --format=json", "from-script")
        .replace("{.credential.access_token}", "{.status.token}");
    let mut kc = KubeConfig::load_from_str(&yaml).unwrap();

    assert_eq!(
        kc.authorization_token().unwrap().as_deref(),
        Some("Bearer from-script")
    );
    assert_eq!(stored_token(&kc).as_deref(), Some("from-script"));
}
