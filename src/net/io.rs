//! 网描述载入与校验：命名库所/迁移/弧 → [`Net`]，JSON/RON 序列化接口.
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use indexmap::IndexMap;
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::net::core::Net;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::structure::{Place, Transition, Weight};

#[derive(Debug, Error)]
pub enum IoError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ron error: {0}")]
    Ron(#[from] ron::Error),
    #[error("ron parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 描述层校验错误；构造 [`Net`] 前快速失败, 指明出错元素.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NetSpecError {
    #[error("duplicate place `{0}`")]
    DuplicatePlace(String),
    #[error("duplicate transition `{0}`")]
    DuplicateTransition(String),
    #[error("`{0}` is declared both as a place and as a transition")]
    AmbiguousName(String),
    #[error("arc `{src}` -> `{target}` references unknown element `{name}`")]
    UnknownName {
        src: String,
        target: String,
        name: String,
    },
    #[error("arc `{src}` -> `{target}` must connect a place and a transition")]
    MismatchedArc { src: String, target: String },
    #[error("arc `{src}` -> `{target}` declared twice")]
    DuplicateArc { src: String, target: String },
    #[error("arc `{src}` -> `{target}` has non-positive weight {weight}")]
    NonPositiveWeight {
        src: String,
        target: String,
        weight: i64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceDescription {
    pub name: String,
    #[serde(default)]
    pub tokens: Weight,
}

/// 弧的方向由端点种类推断：库所→迁移为输入弧, 迁移→库所为输出弧.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcDescription {
    pub source: String,
    pub target: String,
    #[serde(default = "default_weight")]
    pub weight: i64,
}

fn default_weight() -> i64 {
    1
}

/// 前端交给核心的网描述；所有校验在 `build` 中完成, 之后的构造 API 不再复查.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetDescription {
    #[serde(default)]
    pub name: Option<String>,
    pub places: Vec<PlaceDescription>,
    pub transitions: Vec<String>,
    #[serde(default)]
    pub arcs: Vec<ArcDescription>,
}

impl NetDescription {
    pub fn build(&self) -> Result<Net, NetSpecError> {
        let mut net = Net::empty();
        let mut place_ids: IndexMap<String, PlaceId> = IndexMap::new();
        let mut transition_ids: IndexMap<String, TransitionId> = IndexMap::new();

        for place in &self.places {
            if place_ids.contains_key(&place.name) {
                return Err(NetSpecError::DuplicatePlace(place.name.clone()));
            }
            let id = net.add_place(Place::new(place.name.clone(), place.tokens));
            place_ids.insert(place.name.clone(), id);
        }

        for name in &self.transitions {
            if place_ids.contains_key(name) {
                return Err(NetSpecError::AmbiguousName(name.clone()));
            }
            if transition_ids.contains_key(name) {
                return Err(NetSpecError::DuplicateTransition(name.clone()));
            }
            let id = net.add_transition(Transition::new(name.clone()));
            transition_ids.insert(name.clone(), id);
        }

        for arc in &self.arcs {
            if arc.weight <= 0 {
                return Err(NetSpecError::NonPositiveWeight {
                    src: arc.source.clone(),
                    target: arc.target.clone(),
                    weight: arc.weight,
                });
            }
            let weight = arc.weight as Weight;

            let source_place = place_ids.get(&arc.source).copied();
            let source_transition = transition_ids.get(&arc.source).copied();
            let target_place = place_ids.get(&arc.target).copied();
            let target_transition = transition_ids.get(&arc.target).copied();

            for (name, known) in [
                (&arc.source, source_place.is_some() || source_transition.is_some()),
                (&arc.target, target_place.is_some() || target_transition.is_some()),
            ] {
                if !known {
                    return Err(NetSpecError::UnknownName {
                        src: arc.source.clone(),
                        target: arc.target.clone(),
                        name: name.clone(),
                    });
                }
            }

            match (source_place, source_transition, target_place, target_transition) {
                (Some(place), _, _, Some(transition)) => {
                    if *net.pre.get(place, transition) != 0 {
                        return Err(NetSpecError::DuplicateArc {
                            src: arc.source.clone(),
                            target: arc.target.clone(),
                        });
                    }
                    net.set_input_weight(place, transition, weight);
                }
                (_, Some(transition), Some(place), _) => {
                    if *net.post.get(place, transition) != 0 {
                        return Err(NetSpecError::DuplicateArc {
                            src: arc.source.clone(),
                            target: arc.target.clone(),
                        });
                    }
                    net.set_output_weight(place, transition, weight);
                }
                _ => {
                    return Err(NetSpecError::MismatchedArc {
                        src: arc.source.clone(),
                        target: arc.target.clone(),
                    });
                }
            }
        }

        log::debug!(
            "built net `{}`: {} places, {} transitions, {} arcs",
            self.name.as_deref().unwrap_or("unnamed"),
            net.places_len(),
            net.transitions_len(),
            self.arcs.len()
        );
        Ok(net)
    }

    /// 按扩展名选择格式：`.ron` 走 RON, 其余按 JSON 解析.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "ron") {
            read_ron(path)
        } else {
            read_json(path)
        }
    }
}

pub fn to_json_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn from_json_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(serde_json::from_str(s)?)
}

pub fn write_json<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_json_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_json<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    from_json_str(&content)
}

pub fn to_ron_string<T>(value: &T) -> Result<String, IoError>
where
    T: Serialize,
{
    let mut pretty = PrettyConfig::default();
    pretty.new_line = "\n".into();
    Ok(ron::ser::to_string_pretty(value, pretty)?)
}

pub fn from_ron_str<T>(s: &str) -> Result<T, IoError>
where
    T: DeserializeOwned,
{
    Ok(ron::from_str(s)?)
}

pub fn write_ron<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<(), IoError> {
    let mut file = File::create(path)?;
    let content = to_ron_string(value)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

pub fn read_ron<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T, IoError> {
    let mut file = File::open(path)?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    from_ron_str(&content)
}
