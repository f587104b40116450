//! Abstract "neural network" formations: nodes joined by weighted links.

use std::collections::HashSet;
use std::f32::consts::{PI, TAU};

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{spread, GeneratedPoint, LayoutSeed};
use crate::value_objects::{Palette, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NetworkFormation {
    #[default]
    QuantumCortex,
    HyperdimensionalMesh,
    NeuralVortex,
    SynapticCloud,
}

impl NetworkFormation {
    pub const ALL: [NetworkFormation; 4] = [
        Self::QuantumCortex,
        Self::HyperdimensionalMesh,
        Self::NeuralVortex,
        Self::SynapticCloud,
    ];

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::QuantumCortex => "量子皮层",
            Self::HyperdimensionalMesh => "超维网格",
            Self::NeuralVortex => "神经漩涡",
            Self::SynapticCloud => "突触云",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeRole {
    Core,
    Leaf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkNode {
    pub position: Vec3,
    pub level: u32,
    pub role: NodeRole,
    pub size: f32,
    pub distance_from_root: f32,
}

/// Undirected edge between two node indices, `a < b`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkConnection {
    pub a: usize,
    pub b: usize,
    pub strength: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraph {
    pub nodes: Vec<NetworkNode>,
    pub connections: Vec<NetworkConnection>,
    #[serde(skip)]
    linked: HashSet<(usize, usize)>,
}

impl NetworkGraph {
    fn add_node(
        &mut self,
        rng: &mut StdRng,
        position: Vec3,
        level: u32,
        role: NodeRole,
    ) -> usize {
        let size = match role {
            NodeRole::Core => rng.gen_range(0.7..1.2),
            NodeRole::Leaf => rng.gen_range(0.4..0.9),
        };
        self.nodes.push(NetworkNode {
            position,
            level,
            role,
            size,
            distance_from_root: position.length(),
        });
        self.nodes.len() - 1
    }

    /// Links two nodes once; self links and repeats are ignored.
    pub fn connect(&mut self, a: usize, b: usize, strength: f32) -> bool {
        if a == b || a >= self.nodes.len() || b >= self.nodes.len() {
            return false;
        }
        let key = (a.min(b), a.max(b));
        if !self.linked.insert(key) {
            return false;
        }
        self.connections.push(NetworkConnection {
            a: key.0,
            b: key.1,
            strength: strength.clamp(0.0, 1.0),
        });
        true
    }

    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        self.linked.contains(&(a.min(b), a.max(b)))
    }

    pub fn degree(&self, node: usize) -> usize {
        self.connections
            .iter()
            .filter(|c| c.a == node || c.b == node)
            .count()
    }

    /// Points colored by level, for the scene builder.
    pub fn points(&self, palette: &Palette) -> Vec<GeneratedPoint> {
        self.nodes
            .iter()
            .map(|n| GeneratedPoint::new(n.position, palette.color(n.level as usize), n.size))
            .collect()
    }

    fn root(&mut self, rng: &mut StdRng, size: f32) -> usize {
        let root = self.add_node(rng, Vec3::ZERO, 0, NodeRole::Core);
        self.nodes[root].size = size;
        root
    }
}

pub fn generate_network(formation: NetworkFormation, density: f32, seed: LayoutSeed) -> NetworkGraph {
    let density = density.clamp(0.0, 1.0);
    let mut rng = seed.rng();
    match formation {
        NetworkFormation::QuantumCortex => quantum_cortex(density, &mut rng),
        NetworkFormation::HyperdimensionalMesh => hyperdimensional_mesh(density, &mut rng),
        NetworkFormation::NeuralVortex => neural_vortex(density, &mut rng),
        NetworkFormation::SynapticCloud => synaptic_cloud(density, &mut rng),
    }
}

fn quantum_cortex(density: f32, rng: &mut StdRng) -> NetworkGraph {
    const AXES: usize = 6;
    const NODES_PER_AXIS: usize = 8;
    const AXIS_LENGTH: f32 = 20.0;
    const RINGS: [f32; 3] = [5.0, 10.0, 15.0];

    let mut g = NetworkGraph::default();
    let root = g.root(rng, 1.5);

    // fibonacci-sphere axes
    for a in 0..AXES {
        let phi = (-1.0 + 2.0 * a as f32 / AXES as f32).acos();
        let theta = PI * (1.0 + 5f32.sqrt()) * a as f32;
        let dir = Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos());
        let mut prev = root;
        for i in 1..=NODES_PER_AXIS {
            let t = i as f32 / NODES_PER_AXIS as f32;
            let role = if i == NODES_PER_AXIS {
                NodeRole::Leaf
            } else {
                NodeRole::Core
            };
            let node = g.add_node(rng, dir * (AXIS_LENGTH * t.powf(0.8)), i as u32, role);
            g.connect(prev, node, 1.0 - t * 0.3);
            prev = node;
        }
    }

    let mut rings: Vec<Vec<usize>> = Vec::new();
    for dist in RINGS {
        let count = (dist * 3.0 * density).floor() as usize;
        let mut ring = Vec::with_capacity(count);
        for i in 0..count {
            let theta = TAU * i as f32 / count as f32;
            let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
            let pos = Vec3::new(
                dist * phi.sin() * theta.cos(),
                dist * phi.sin() * theta.sin(),
                dist * phi.cos(),
            );
            let role = if rng.gen::<f32>() < 0.4 {
                NodeRole::Leaf
            } else {
                NodeRole::Core
            };
            ring.push(g.add_node(rng, pos, (dist / 5.0).ceil() as u32, role));
        }
        for i in 0..ring.len() {
            g.connect(ring[i], ring[(i + 1) % ring.len()], 0.7);
            if i % 4 == 0 && ring.len() > 5 {
                g.connect(ring[i], ring[(i + ring.len() / 2) % ring.len()], 0.4);
            }
        }
        rings.push(ring);
    }

    // tie ring nodes to the nearest core node within reach
    let ring_nodes: Vec<usize> = rings.iter().flatten().copied().collect();
    for &node in &ring_nodes {
        let here = g.nodes[node].position;
        let nearest = g
            .nodes
            .iter()
            .enumerate()
            .filter(|(j, n)| *j != root && *j != node && n.level > 0 && n.role == NodeRole::Core)
            .map(|(j, n)| (j, n.position.distance(here)))
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((target, dist)) = nearest {
            if dist < 8.0 {
                g.connect(node, target, 0.5 + (1.0 - dist / 8.0) * 0.5);
            }
        }
    }

    for pair in rings.windows(2) {
        let (inner, outer) = (&pair[0], &pair[1]);
        if inner.is_empty() || outer.is_empty() {
            continue;
        }
        for _ in 0..inner.len() / 2 {
            let a = inner[rng.gen_range(0..inner.len())];
            let b = outer[rng.gen_range(0..outer.len())];
            g.connect(a, b, 0.6);
        }
    }

    g
}

fn hyperdimensional_mesh(density: f32, rng: &mut StdRng) -> NetworkGraph {
    const MAX_RADIUS: f32 = 20.0;
    let per_dimension = (40.0 * density).floor() as usize;
    let axes = [
        Vec3::new(1.0, 1.0, 1.0).normalize(),
        Vec3::new(-1.0, 1.0, -1.0).normalize(),
        Vec3::new(1.0, -1.0, -1.0).normalize(),
        Vec3::new(-1.0, -1.0, 1.0).normalize(),
    ];

    let mut g = NetworkGraph::default();
    let root = g.root(rng, 1.5);
    let mut groups: Vec<Vec<usize>> = vec![Vec::new(); axes.len()];

    for (d, axis) in axes.iter().enumerate() {
        for _ in 0..per_dimension {
            let distance = MAX_RADIUS * rng.gen::<f32>().powf(0.7);
            let noise = Vec3::new(spread(rng, 0.5), spread(rng, 0.5), spread(rng, 0.5)).normalize();
            let dir = (*axis * (0.6 + rng.gen::<f32>() * 0.4) + noise * 0.3).normalize();
            let leaf = rng.gen::<f32>() < 0.4 || distance > MAX_RADIUS * 0.8;
            let level = (distance / (MAX_RADIUS / 4.0)).floor() as u32 + 1;
            let role = if leaf { NodeRole::Leaf } else { NodeRole::Core };
            let node = g.add_node(rng, dir * distance, level, role);
            groups[d].push(node);
            if distance < MAX_RADIUS * 0.3 {
                g.connect(root, node, 0.7);
            }
        }
    }

    for group in &groups {
        for &node in group {
            let here = g.nodes[node].position;
            let mut nearby: Vec<(usize, f32)> = group
                .iter()
                .filter(|&&other| other != node)
                .map(|&other| (other, g.nodes[other].position.distance(here)))
                .collect();
            nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
            let wanted = 1 + rng.gen_range(0..3);
            for &(other, _) in nearby.iter().take(wanted) {
                let strength = 0.4 + rng.gen::<f32>() * 0.4;
                g.connect(node, other, strength);
            }
        }
    }

    g
}

fn neural_vortex(density: f32, rng: &mut StdRng) -> NetworkGraph {
    const SPIRALS: usize = 6;
    const HEIGHT: f32 = 30.0;
    const MAX_RADIUS: f32 = 16.0;
    const REVOLUTIONS: f32 = 2.5;
    let per_spiral = (30.0 * density).floor() as usize;

    let mut g = NetworkGraph::default();
    let root = g.root(rng, 1.8);

    for s in 0..SPIRALS {
        let phase = s as f32 / SPIRALS as f32 * TAU;
        let mut prev: Option<usize> = None;
        for i in 0..per_spiral {
            let t = if per_spiral > 1 {
                i as f32 / (per_spiral - 1) as f32
            } else {
                0.0
            };
            let height = (t - 0.5) * HEIGHT;
            let radius = MAX_RADIUS * (t * PI).sin();
            let angle = phase + t * TAU * REVOLUTIONS;
            let pos = Vec3::new(radius * angle.cos(), height, radius * angle.sin())
                + Vec3::new(spread(rng, 0.75), spread(rng, 0.75), spread(rng, 0.75));
            let leaf = rng.gen::<f32>() < 0.3 || i + 3 > per_spiral;
            let role = if leaf { NodeRole::Leaf } else { NodeRole::Core };
            let node = g.add_node(rng, pos, (t * 5.0).floor() as u32 + 1, role);
            match prev {
                None => g.connect(root, node, 1.0),
                Some(p) => g.connect(p, node, 0.9),
            };
            prev = Some(node);
        }
    }

    g
}

fn synaptic_cloud(density: f32, rng: &mut StdRng) -> NetworkGraph {
    const CLUSTERS: usize = 6;
    const MAX_DIST: f32 = 18.0;
    let cluster_size = (20.0 * density).floor() as usize;

    let mut g = NetworkGraph::default();
    let root = g.root(rng, 1.5);
    let mut hubs = Vec::with_capacity(CLUSTERS);

    for _ in 0..CLUSTERS {
        let phi = (2.0 * rng.gen::<f32>() - 1.0).acos();
        let theta = TAU * rng.gen::<f32>();
        let distance = MAX_DIST * (0.3 + 0.7 * rng.gen::<f32>());
        let pos = Vec3::new(
            distance * phi.sin() * theta.cos(),
            distance * phi.sin() * theta.sin(),
            distance * phi.cos(),
        );
        let hub = g.add_node(rng, pos, 1, NodeRole::Core);
        g.nodes[hub].size = 1.2;
        g.connect(root, hub, 0.9);
        hubs.push(hub);

        let cloud_radius = 7.0 + rng.gen::<f32>() * 3.0;
        for _ in 0..cluster_size {
            let radius = cloud_radius * rng.gen::<f32>().sqrt();
            let dir = Vec3::new(spread(rng, 1.0), spread(rng, 1.0), spread(rng, 1.0)).normalize();
            let role = if rng.gen::<f32>() < 0.5 {
                NodeRole::Leaf
            } else {
                NodeRole::Core
            };
            let child = g.add_node(rng, pos + dir * radius, 2 + (radius / 3.0).floor() as u32, role);
            g.connect(hub, child, 0.7 * (1.0 - radius / cloud_radius));
        }
    }

    for i in 0..hubs.len() {
        for j in i + 1..hubs.len() {
            let dist = g.nodes[hubs[i]].position.distance(g.nodes[hubs[j]].position);
            let reach = 1.0 - dist / (MAX_DIST * 2.0);
            if rng.gen::<f32>() < reach {
                g.connect(hubs[i], hubs[j], 0.5 + 0.5 * reach);
            }
        }
    }

    g
}
