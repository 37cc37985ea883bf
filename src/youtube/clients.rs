//! Official-client fingerprints the InnerTube API is called with.
//!
//! The numeric id sent in `X-YouTube-Client-Name` must match the string
//! `clientName` in the request body, so both live in one table.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientKind {
    WebRemix,
    Web,
    Mweb,
    Android,
    Ios,
    AndroidMusic,
}

#[derive(Debug, Clone)]
pub struct ClientProfile {
    pub kind: ClientKind,
    pub name: &'static str,
    pub id: u32,
    pub version: &'static str,
    pub user_agent: &'static str,
    pub platform: &'static str,
    pub os_name: Option<&'static str>,
    pub os_version: Option<&'static str>,
    pub device_make: Option<&'static str>,
    pub device_model: Option<&'static str>,
    pub android_sdk_version: Option<u32>,
    /// Browser clients are served web-style headers when streaming.
    pub browser: bool,
    pub extra_headers: &'static [(&'static str, &'static str)],
}

const DESKTOP_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

static WEB_REMIX: ClientProfile = ClientProfile {
    kind: ClientKind::WebRemix,
    name: "WEB_REMIX",
    id: 67,
    version: "1.20241120.01.00",
    user_agent: DESKTOP_CHROME_UA,
    platform: "DESKTOP",
    os_name: None,
    os_version: None,
    device_make: None,
    device_model: None,
    android_sdk_version: None,
    browser: true,
    extra_headers: &[
        ("origin", "https://music.youtube.com"),
        ("referer", "https://music.youtube.com/"),
    ],
};

static WEB: ClientProfile = ClientProfile {
    kind: ClientKind::Web,
    name: "WEB",
    id: 1,
    version: "2.20241126.01.00",
    user_agent: DESKTOP_CHROME_UA,
    platform: "DESKTOP",
    os_name: None,
    os_version: None,
    device_make: None,
    device_model: None,
    android_sdk_version: None,
    browser: true,
    extra_headers: &[
        ("origin", "https://www.youtube.com"),
        ("referer", "https://www.youtube.com/"),
    ],
};

static MWEB: ClientProfile = ClientProfile {
    kind: ClientKind::Mweb,
    name: "MWEB",
    id: 2,
    version: "2.20241202.07.00",
    user_agent: "Mozilla/5.0 (iPad; CPU OS 16_7_10 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1,gzip(gfe)",
    platform: "MOBILE",
    os_name: None,
    os_version: None,
    device_make: None,
    device_model: None,
    android_sdk_version: None,
    browser: true,
    extra_headers: &[
        ("origin", "https://m.youtube.com"),
        ("referer", "https://m.youtube.com/"),
    ],
};

static ANDROID: ClientProfile = ClientProfile {
    kind: ClientKind::Android,
    name: "ANDROID",
    id: 3,
    version: "19.44.38",
    user_agent: "com.google.android.youtube/19.44.38 (Linux; U; Android 14; en_US; Pixel 8) gzip",
    platform: "MOBILE",
    os_name: Some("Android"),
    os_version: Some("14"),
    device_make: Some("Google"),
    device_model: Some("Pixel 8"),
    android_sdk_version: Some(34),
    browser: false,
    extra_headers: &[],
};

static IOS: ClientProfile = ClientProfile {
    kind: ClientKind::Ios,
    name: "IOS",
    id: 5,
    version: "19.45.4",
    user_agent: "com.google.ios.youtube/19.45.4 (iPhone16,2; U; CPU iOS 18_1_0 like Mac OS X;)",
    platform: "MOBILE",
    os_name: Some("iPhone"),
    os_version: Some("18.1.0.22B83"),
    device_make: Some("Apple"),
    device_model: Some("iPhone16,2"),
    android_sdk_version: None,
    browser: false,
    extra_headers: &[],
};

static ANDROID_MUSIC: ClientProfile = ClientProfile {
    kind: ClientKind::AndroidMusic,
    name: "ANDROID_MUSIC",
    id: 21,
    version: "7.27.52",
    user_agent: "com.google.android.apps.youtube.music/7.27.52 (Linux; U; Android 14) gzip",
    platform: "MOBILE",
    os_name: Some("Android"),
    os_version: Some("14"),
    device_make: Some("Google"),
    device_model: Some("Pixel 8"),
    android_sdk_version: Some(34),
    browser: false,
    extra_headers: &[],
};

impl ClientKind {
    pub const ALL: [ClientKind; 6] = [
        ClientKind::WebRemix,
        ClientKind::Web,
        ClientKind::Mweb,
        ClientKind::Android,
        ClientKind::Ios,
        ClientKind::AndroidMusic,
    ];

    pub fn profile(&self) -> &'static ClientProfile {
        match self {
            ClientKind::WebRemix => &WEB_REMIX,
            ClientKind::Web => &WEB,
            ClientKind::Mweb => &MWEB,
            ClientKind::Android => &ANDROID,
            ClientKind::Ios => &IOS,
            ClientKind::AndroidMusic => &ANDROID_MUSIC,
        }
    }

    /// Maps the `clientName` string (also used as the `c=` parameter of
    /// stream URLs) back to a known client.
    pub fn from_wire_name(name: &str) -> Option<ClientKind> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.profile().name.eq_ignore_ascii_case(name))
    }
}

impl ClientProfile {
    /// The `context` object embedded in every InnerTube POST body.
    pub fn context(&self, hl: &str, gl: &str) -> Value {
        let mut client = json!({
            "clientName": self.name,
            "clientVersion": self.version,
            "hl": hl,
            "gl": gl,
            "platform": self.platform,
            "userAgent": self.user_agent,
        });

        if self.browser {
            client["clientFormFactor"] = json!("UNKNOWN_FORM_FACTOR");
        }
        if let Some(os_name) = self.os_name {
            client["osName"] = json!(os_name);
        }
        if let Some(os_version) = self.os_version {
            client["osVersion"] = json!(os_version);
        }
        if let Some(make) = self.device_make {
            client["deviceMake"] = json!(make);
        }
        if let Some(model) = self.device_model {
            client["deviceModel"] = json!(model);
        }
        if let Some(sdk) = self.android_sdk_version {
            client["androidSdkVersion"] = json!(sdk);
        }

        json!({
            "client": client,
            "user": { "lockedSafetyMode": false }
        })
    }
}
