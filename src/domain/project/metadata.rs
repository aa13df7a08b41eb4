//! Two-Zone Project Metadata
//!
//! 远端 `metadata_json` 的布局:
//! ```json
//! {
//!   "user_concept": { ...受保护区：用户确认的档案... },
//!   "llm_runtime":  { ...运行时区：任务输出写入... },
//!   "profile": <user_concept.profile 的镜像>,
//!   ...其它未知键原样保留
//! }
//! ```
//!
//! 规则:
//! - 受保护区只在定稿时整体覆盖，其余写入只补齐缺失键
//! - 运行时区始终合并，不丢弃客户端不认识的键

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const USER_CONCEPT_KEY: &str = "user_concept";
pub const LLM_RUNTIME_KEY: &str = "llm_runtime";
const PROFILE_KEY: &str = "profile";
const MIRRORED_TEXT_KEYS: [&str; 2] = ["subtitle", "instruction_brief"];

/// 双区元数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    #[serde(default)]
    user_concept: Map<String, Value>,
    #[serde(default)]
    llm_runtime: Map<String, Value>,
    #[serde(default)]
    extra: Map<String, Value>,
}

impl ProjectMetadata {
    /// 从远端 JSON 解析，容忍任意形状
    pub fn from_wire(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut extra = object.clone();
        let mut user_concept = take_object(&mut extra, USER_CONCEPT_KEY);
        let llm_runtime = take_object(&mut extra, LLM_RUNTIME_KEY);

        // 旧版布局把 profile 等字段放在顶层
        let legacy_profile = extra.remove(PROFILE_KEY);
        if !matches!(user_concept.get(PROFILE_KEY), Some(Value::Object(_))) {
            if let Some(profile @ Value::Object(_)) = legacy_profile {
                user_concept.insert(PROFILE_KEY.to_string(), profile);
            }
        }
        for key in MIRRORED_TEXT_KEYS {
            let legacy = extra.remove(key);
            if user_concept.contains_key(key) {
                continue;
            }
            if let Some(text @ Value::String(_)) = legacy {
                user_concept.insert(key.to_string(), text);
            }
        }

        Self {
            user_concept,
            llm_runtime,
            extra,
        }
    }

    /// 序列化为远端布局（带顶层镜像字段）
    pub fn to_wire(&self) -> Value {
        let mut out = self.extra.clone();
        out.insert(
            USER_CONCEPT_KEY.to_string(),
            Value::Object(self.user_concept.clone()),
        );
        out.insert(
            LLM_RUNTIME_KEY.to_string(),
            Value::Object(self.llm_runtime.clone()),
        );
        if let Some(profile @ Value::Object(_)) = self.user_concept.get(PROFILE_KEY) {
            out.insert(PROFILE_KEY.to_string(), profile.clone());
        }
        for key in MIRRORED_TEXT_KEYS {
            if let Some(value) = self.user_concept.get(key) {
                out.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(out)
    }

    /// 用给定的受保护区和本地运行时区组装上行元数据
    pub fn with_protected_zone(&self, user_concept: Map<String, Value>) -> Self {
        Self {
            user_concept,
            llm_runtime: self.llm_runtime.clone(),
            extra: self.extra.clone(),
        }
    }

    pub fn user_concept(&self) -> &Map<String, Value> {
        &self.user_concept
    }

    pub fn llm_runtime(&self) -> &Map<String, Value> {
        &self.llm_runtime
    }

    /// 合并运行时区（浅合并，新值覆盖同名键）
    pub fn merge_runtime(&mut self, incoming: &Map<String, Value>) {
        for (key, value) in incoming {
            self.llm_runtime.insert(key.clone(), value.clone());
        }
    }

    /// 吸收服务端回显
    ///
    /// 运行时区合并；受保护区只填补本地缺失或为空的键
    pub fn absorb_server_echo(&mut self, echo: &ProjectMetadata) {
        self.merge_runtime(&echo.llm_runtime);
        for (key, value) in &echo.user_concept {
            let keep_local = self
                .user_concept
                .get(key)
                .map(|local| !is_empty_value(local))
                .unwrap_or(false);
            if !keep_local {
                self.user_concept.insert(key.clone(), value.clone());
            }
        }
        for (key, value) in &echo.extra {
            self.extra.insert(key.clone(), value.clone());
        }
    }

    /// 吸收任务结果携带的元数据
    ///
    /// 带 `user_concept`/`llm_runtime` 的双区形状按服务端回显处理，
    /// 扁平形状整体视为运行时键
    pub fn absorb_run_metadata(&mut self, incoming: &Map<String, Value>) {
        if incoming.contains_key(USER_CONCEPT_KEY) || incoming.contains_key(LLM_RUNTIME_KEY) {
            let echo = Self::from_wire(&Value::Object(incoming.clone()));
            self.absorb_server_echo(&echo);
        } else {
            self.merge_runtime(incoming);
        }
    }

    /// 定稿：整体替换受保护区
    pub fn replace_protected_zone(&mut self, user_concept: Map<String, Value>) {
        self.user_concept = user_concept;
    }

    /// 定稿：把用户确认的条目合入 `profile` 子对象
    pub fn merge_profile_entries(&mut self, entries: Map<String, Value>) {
        let profile = self
            .user_concept
            .entry(PROFILE_KEY.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !profile.is_object() {
            *profile = Value::Object(Map::new());
        }
        if let Value::Object(map) = profile {
            map.extend(entries);
        }
    }
}

/// 计算受保护区快照
///
/// `overwrite` 为 false 时只补齐缺失键（幂等），为 true 时用档案字段覆盖
pub fn seed_protected_zone(
    zone: &mut Map<String, Value>,
    fields: Map<String, Value>,
    overwrite: bool,
) {
    for (key, value) in fields {
        if overwrite {
            zone.insert(key, value);
        } else {
            zone.entry(key).or_insert(value);
        }
    }
    if !matches!(zone.get(PROFILE_KEY), Some(Value::Object(_))) {
        zone.insert(PROFILE_KEY.to_string(), Value::Object(Map::new()));
    }
}

fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(inner)) => inner,
        _ => Map::new(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
