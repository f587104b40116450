//! Built-in sample cast, used when no catalog storage is reachable.

use super::Catalog;
use crate::entities::Character;
use crate::ids::CharacterId;
use crate::value_objects::{CelestialBody, Relationship, RelationshipKind};

use CelestialBody::*;

const CATEGORIES: [&str; 4] = ["主角", "神仙", "妖魔", "仙人"];

// (name, category slot, importance, orbit, aliases)
const CAST: [(&str, usize, f32, CelestialBody, &[&str]); 21] = [
    ("孙悟空", 0, 1.0, Earth, &["美猴王", "齐天大圣"]),
    ("唐僧", 0, 0.9, Earth, &["玄奘", "三藏法师"]),
    ("猪八戒", 0, 0.8, Earth, &["猪悟能", "天蓬元帅"]),
    ("沙僧", 0, 0.7, Earth, &["沙悟净", "卷帘大将"]),
    ("白龙马", 0, 0.6, Earth, &["敖烈", "三太子"]),
    ("如来佛祖", 1, 1.0, Mercury, &["释迦牟尼", "佛祖"]),
    ("观音菩萨", 1, 0.95, Venus, &["观世音", "南海观音"]),
    ("玉皇大帝", 1, 1.0, Sun, &["昊天上帝", "天帝"]),
    ("太上老君", 1, 0.9, Uranus, &["老子", "道德天尊"]),
    ("二郎神", 1, 0.8, Saturn, &["杨戬", "显圣真君"]),
    ("哪吒", 1, 0.75, Saturn, &["三太子"]),
    ("牛魔王", 2, 0.85, Mars, &["大力王"]),
    ("铁扇公主", 2, 0.75, Mars, &["罗刹女"]),
    ("红孩儿", 2, 0.7, Mars, &["圣婴大王"]),
    ("白骨精", 2, 0.65, Mars, &["白骨夫人"]),
    ("金角大王", 2, 0.6, Jupiter, &[]),
    ("银角大王", 2, 0.6, Jupiter, &[]),
    ("文殊菩萨", 1, 0.8, Mercury, &["文殊师利"]),
    ("李天王", 1, 0.7, Saturn, &["托塔天王", "李靖"]),
    ("太白金星", 1, 0.65, Saturn, &[]),
    ("镇元大仙", 3, 0.6, Neptune, &["地仙之祖"]),
];

// (from, to, kind, strength) as offsets into CAST
const EDGES: [(usize, usize, RelationshipKind, f32); 19] = [
    (1, 0, RelationshipKind::MasterDisciple, 0.9),
    (1, 2, RelationshipKind::MasterDisciple, 0.8),
    (1, 3, RelationshipKind::MasterDisciple, 0.85),
    (1, 4, RelationshipKind::MasterDisciple, 0.7),
    (0, 2, RelationshipKind::FellowDisciple, 0.7),
    (0, 3, RelationshipKind::FellowDisciple, 0.8),
    (2, 3, RelationshipKind::FellowDisciple, 0.75),
    (11, 12, RelationshipKind::Family, 0.8),
    (11, 13, RelationshipKind::Family, 0.9),
    (12, 13, RelationshipKind::Family, 0.9),
    (0, 14, RelationshipKind::Enemy, 0.9),
    (0, 11, RelationshipKind::Enemy, 0.8),
    (0, 15, RelationshipKind::Enemy, 0.7),
    (0, 16, RelationshipKind::Enemy, 0.7),
    (7, 9, RelationshipKind::Superior, 0.8),
    (7, 10, RelationshipKind::Superior, 0.75),
    (7, 18, RelationshipKind::Superior, 0.7),
    (5, 6, RelationshipKind::Buddhist, 0.9),
    (5, 17, RelationshipKind::Buddhist, 0.8),
];

fn sample_id(offset: usize) -> CharacterId {
    CharacterId::new(format!("sample-{offset:02}"))
}

impl Catalog {
    /// Small hand-curated cast with relationships and orbits; no events.
    pub fn sample() -> Self {
        let mut characters: Vec<Character> = CAST
            .iter()
            .enumerate()
            .map(|(i, (name, slot, importance, body, aliases))| {
                Character::new(sample_id(i), *name, CATEGORIES[*slot])
                    .with_rank(i as u32 + 1)
                    .with_power((importance * 100.0).round() as i64)
                    .with_celestial(*body)
                    .with_aliases(aliases.iter().map(|a| a.to_string()).collect())
            })
            .collect();

        for (from, to, kind, strength) in EDGES {
            characters[from]
                .relationships
                .push(Relationship::new(sample_id(to), kind, strength));
        }

        Catalog::new(characters, Vec::new(), Vec::new())
    }
}
