//! Scene commands: build a node hierarchy from a file and evaluate it

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use nou_math::{Trs, Vec3, euler_degrees_from_quat, quat_from_euler_degrees};
use nou_scene::{Hierarchy, NodeId, Transform};
use serde::{Deserialize, Serialize};

use super::OutputFormat;
use crate::utils::{
    NodeKind, TreeNode, TreeOptions, add_table_row, clean, create_table, format_vec3,
    read_data_file, render_tree,
};

#[derive(Subcommand)]
pub enum SceneCommands {
    /// Compute world transforms for every node of a scene file
    Eval {
        /// Path to the scene file (.yaml, .yml or .json)
        file: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Tree)]
        format: OutputFormat,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

/// Flat list of named nodes; parents are referenced by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneFile {
    pub nodes: Vec<SceneNodeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNodeDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler angles in degrees
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

impl SceneNodeDef {
    fn transform(&self) -> Transform {
        Transform::from_trs(Trs::new(
            Vec3::from_array(self.position),
            quat_from_euler_degrees(Vec3::from_array(self.rotation)),
            Vec3::from_array(self.scale),
        ))
    }
}

/// World-space result for one node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldRow {
    pub node: String,
    pub parent: Option<String>,
    pub depth: usize,
    pub position: [f32; 3],
    /// Euler angles in degrees
    pub rotation: [f32; 3],
    pub scale: [f32; 3],
}

/// Build a hierarchy from a scene description
///
/// Nodes are created first and linked afterwards, so a parent may be
/// declared after its children.
pub fn build_hierarchy(scene: &SceneFile) -> Result<(Hierarchy, HashMap<String, NodeId>)> {
    let mut hierarchy = Hierarchy::new();
    let mut ids = HashMap::with_capacity(scene.nodes.len());

    for def in &scene.nodes {
        if ids.contains_key(&def.name) {
            bail!("Duplicate node name '{}'", def.name);
        }
        let id = hierarchy.create_with(def.name.clone(), def.transform());
        ids.insert(def.name.clone(), id);
    }

    for def in &scene.nodes {
        let Some(parent_name) = &def.parent else {
            continue;
        };
        let Some(&parent) = ids.get(parent_name) else {
            bail!(
                "Node '{}' references unknown parent '{parent_name}'",
                def.name
            );
        };
        let child = ids[&def.name];
        hierarchy
            .set_parent(child, Some(parent))
            .with_context(|| format!("Cannot attach '{}' to '{parent_name}'", def.name))?;
    }

    log::debug!(
        "Built hierarchy with {} nodes, {} roots",
        hierarchy.len(),
        hierarchy.roots().count()
    );
    Ok((hierarchy, ids))
}

/// World transforms in update order (parents before children)
pub fn world_rows(hierarchy: &Hierarchy) -> Result<Vec<WorldRow>> {
    hierarchy
        .update_order()
        .iter()
        .map(|&id| -> Result<WorldRow> {
            let node = hierarchy.node(id)?;
            let world = Trs::from_matrix(&node.world_matrix());
            let parent = match node.parent() {
                Some(p) => Some(hierarchy.node(p)?.name().to_string()),
                None => None,
            };
            Ok(WorldRow {
                node: node.name().to_string(),
                parent,
                depth: node.depth(),
                position: world.translation.to_array().map(clean),
                rotation: euler_degrees_from_quat(world.rotation).to_array().map(clean),
                scale: world.scale.to_array().map(clean),
            })
        })
        .collect()
}

pub fn execute(cmd: SceneCommands) -> Result<()> {
    match cmd {
        SceneCommands::Eval {
            file,
            format,
            no_color,
        } => handle_eval(&file, format, no_color),
    }
}

fn handle_eval(path: &Path, format: OutputFormat, no_color: bool) -> Result<()> {
    let scene: SceneFile = read_data_file(path)
        .with_context(|| format!("Failed to read scene file {}", path.display()))?;
    let (mut hierarchy, _) = build_hierarchy(&scene)?;
    hierarchy.recompute_global();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&world_rows(&hierarchy)?)?);
        }
        OutputFormat::Table => {
            let mut table =
                create_table(vec!["Node", "Parent", "Depth", "World position", "World scale"]);
            for row in world_rows(&hierarchy)? {
                add_table_row(
                    &mut table,
                    vec![
                        row.node,
                        row.parent.unwrap_or_else(|| "-".to_string()),
                        row.depth.to_string(),
                        format_vec3(Vec3::from_array(row.position)),
                        format_vec3(Vec3::from_array(row.scale)),
                    ],
                );
            }
            table.printstd();
        }
        OutputFormat::Tree => {
            let mut root = TreeNode::new(format!("Scene: {}", path.display()), NodeKind::Root);
            for id in hierarchy.roots().collect::<Vec<_>>() {
                root = root.add_child(scene_tree(&hierarchy, id)?);
            }
            let options = TreeOptions {
                no_color,
                show_metadata: true,
                ..Default::default()
            };
            print!("{}", render_tree(&root, &options));
        }
    }

    Ok(())
}

fn scene_tree(hierarchy: &Hierarchy, id: NodeId) -> Result<TreeNode> {
    let node = hierarchy.node(id)?;
    let local = node.transform();
    let mut tree = TreeNode::new(node.name(), NodeKind::Node)
        .with_detail(format_vec3(hierarchy.world_position(id)?))
        .with_metadata("local", format_vec3(local.position()))
        .with_metadata("depth", node.depth().to_string());
    for &child in node.children() {
        tree = tree.add_child(scene_tree(hierarchy, child)?);
    }
    Ok(tree)
}
