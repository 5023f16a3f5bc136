//! Rig commands: inspect a skeleton with its clips, play its blend chain

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use console::Style;
use nou_anim::{
    AnimSource, Animator, BlendMode, ClipEvaluator, JointIndexMap, LoadWarning, Pose,
    SkeletalAnim, Skeleton, SkinSource, load_clip, load_skeleton,
};
use nou_math::{Quat, Vec3, euler_degrees_from_quat};
use serde::{Deserialize, Serialize};

use super::OutputFormat;
use crate::utils::{
    NodeKind, TreeNode, TreeOptions, add_table_row, clean, create_table, format_rotation,
    format_seconds, format_vec3, read_data_file, render_tree,
};

#[derive(Subcommand)]
pub enum RigCommands {
    /// Show the joint hierarchy, clips and blend layers of a rig file
    Info {
        /// Path to the rig file (.yaml, .yml or .json)
        file: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Play the rig's blend chain and print the final joint poses
    Play {
        /// Path to the rig file
        file: PathBuf,

        /// Number of frames to simulate
        #[arg(short = 'n', long, default_value_t = 60)]
        frames: u32,

        /// Seconds per frame
        #[arg(long, default_value_t = 1.0 / 60.0)]
        dt: f32,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Sample a single clip at a point in time
    Sample {
        /// Path to the rig file
        file: PathBuf,

        /// Clip name
        #[arg(short, long)]
        clip: String,

        /// Time in seconds (wrapped into the clip)
        #[arg(short, long, default_value_t = 0.0)]
        time: f32,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

/// A skinned skeleton with its animations and blend chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigFile {
    pub skin: SkinSource,
    #[serde(default)]
    pub animations: Vec<AnimSource>,
    /// Blend chain, front first
    #[serde(default)]
    pub blend: Vec<BlendLayer>,
}

/// One node of the blend chain in a rig file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlendLayer {
    /// Name of an entry in `animations`
    pub clip: String,
    #[serde(default)]
    pub mode: BlendMode,
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Convert the clip to deltas from the bind pose before use
    #[serde(default)]
    pub diff: bool,
}

fn default_weight() -> f32 {
    1.0
}

/// A loaded rig ready to animate
#[derive(Debug, Clone)]
pub struct Rig {
    pub skeleton: Skeleton,
    pub index_map: JointIndexMap,
    pub clips: Vec<SkeletalAnim>,
    pub layers: Vec<BlendLayer>,
    pub warnings: Vec<LoadWarning>,
}

impl Rig {
    /// Read and load a rig file
    pub fn load(path: &Path) -> Result<Self> {
        let file: RigFile = read_data_file(path)
            .with_context(|| format!("Failed to read rig file {}", path.display()))?;
        Self::from_file(file).with_context(|| format!("Failed to load rig {}", path.display()))
    }

    /// Build the skeleton and clips described by a rig file
    pub fn from_file(file: RigFile) -> Result<Self> {
        let loaded = load_skeleton(&file.skin).context("Invalid skin")?;
        let mut warnings = loaded.warnings;

        let mut clips = Vec::with_capacity(file.animations.len());
        for source in &file.animations {
            let clip = load_clip(source, &loaded.index_map)
                .with_context(|| format!("Invalid animation '{}'", source.name))?;
            warnings.extend(clip.warnings);
            clips.push(clip.anim);
        }

        Ok(Self {
            skeleton: loaded.skeleton,
            index_map: loaded.index_map,
            clips,
            layers: file.blend,
            warnings,
        })
    }

    pub fn clip(&self, name: &str) -> Option<&SkeletalAnim> {
        self.clips.iter().find(|c| c.name() == name)
    }

    /// Animator with the rig's blend chain installed
    pub fn animator(&self) -> Result<Animator> {
        let mut animator = Animator::new(self.skeleton.clone());
        for layer in &self.layers {
            let Some(clip) = self.clip(&layer.clip) else {
                bail!("Blend layer references unknown clip '{}'", layer.clip);
            };
            let mut clip = clip.clone();
            if layer.diff {
                clip.convert_to_diff(&self.skeleton)?;
            }
            animator.push_layer(Arc::new(clip), layer.mode, layer.weight);
        }
        Ok(animator)
    }
}

/// Pose of one joint as printed by `play` and `sample`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointRow {
    pub joint: String,
    pub parent: Option<String>,
    pub position: [f32; 3],
    /// Euler angles in degrees
    pub rotation: [f32; 3],
}

impl JointRow {
    fn new(skeleton: &Skeleton, index: usize, position: Vec3, rotation: Quat) -> Self {
        let joints = skeleton.joints();
        let euler = euler_degrees_from_quat(rotation);
        Self {
            joint: joints[index].name().to_string(),
            parent: joints[index]
                .parent()
                .map(|p| joints[p].name().to_string()),
            position: position.to_array().map(clean),
            rotation: euler.to_array().map(clean),
        }
    }
}

pub fn execute(cmd: RigCommands) -> Result<()> {
    match cmd {
        RigCommands::Info { file, no_color } => handle_info(&file, no_color),
        RigCommands::Play {
            file,
            frames,
            dt,
            format,
        } => handle_play(&file, frames, dt, format),
        RigCommands::Sample {
            file,
            clip,
            time,
            format,
        } => handle_sample(&file, &clip, time, format),
    }
}

fn handle_info(path: &Path, no_color: bool) -> Result<()> {
    let rig = Rig::load(path)?;
    let skeleton = &rig.skeleton;

    println!("=== Rig: {} ===", path.display());
    println!("Joints: {}", skeleton.joint_count());
    println!();

    let root = TreeNode::new("Skeleton", NodeKind::Root);
    let tree = joint_tree(root, skeleton, |i| {
        let joint = &skeleton.joints()[i];
        Some(format!(
            "{} {}",
            format_vec3(joint.base_position()),
            format_rotation(joint.base_rotation())
        ))
    });
    let options = TreeOptions {
        no_color,
        ..Default::default()
    };
    print!("{}", render_tree(&tree, &options));

    if !rig.clips.is_empty() {
        println!();
        let mut table = create_table(vec!["Clip", "Duration", "Tracks"]);
        for clip in &rig.clips {
            add_table_row(
                &mut table,
                vec![
                    clip.name().to_string(),
                    format_seconds(clip.duration()),
                    clip.tracks().len().to_string(),
                ],
            );
        }
        table.printstd();
    }

    if !rig.layers.is_empty() {
        println!();
        let mut table = create_table(vec!["#", "Clip", "Mode", "Weight", "Diff"]);
        for (i, layer) in rig.layers.iter().enumerate() {
            add_table_row(
                &mut table,
                vec![
                    i.to_string(),
                    layer.clip.clone(),
                    layer.mode.to_string(),
                    format!("{:.2}", layer.weight.clamp(0.0, 1.0)),
                    if layer.diff { "yes" } else { "no" }.to_string(),
                ],
            );
        }
        table.printstd();
    }

    if !rig.warnings.is_empty() {
        let style = if no_color {
            Style::new()
        } else {
            Style::new().yellow()
        };
        println!();
        println!("Warnings:");
        for warning in &rig.warnings {
            println!("  {}", style.apply_to(warning));
        }
    }

    Ok(())
}

fn handle_play(path: &Path, frames: u32, dt: f32, format: OutputFormat) -> Result<()> {
    if !(dt.is_finite() && dt >= 0.0) {
        bail!("--dt must be a non-negative number, got {dt}");
    }

    let rig = Rig::load(path)?;
    let mut animator = rig.animator()?;
    if animator.tree().is_empty() {
        log::warn!("Rig has no blend layers, playing the bind pose");
    }

    for _ in 0..frames {
        animator.tick(dt);
    }
    log::info!("Simulated {frames} frames of {dt}s");

    let skeleton = animator.skeleton();
    let rows: Vec<JointRow> = (0..skeleton.joint_count())
        .map(|i| {
            let world = skeleton.joints()[i].global();
            let (_, rotation, position) = world.to_scale_rotation_translation();
            JointRow::new(skeleton, i, position, rotation)
        })
        .collect();

    print_rows(&rows, skeleton, format, "World position", "World rotation")
}

fn handle_sample(path: &Path, clip: &str, time: f32, format: OutputFormat) -> Result<()> {
    let rig = Rig::load(path)?;
    let Some(anim) = rig.clip(clip) else {
        let names: Vec<&str> = rig.clips.iter().map(SkeletalAnim::name).collect();
        bail!("Unknown clip '{clip}'. Available: {}", names.join(", "));
    };

    let mut evaluator = ClipEvaluator::new(Arc::new(anim.clone()), &rig.skeleton);
    evaluator.seek(time);
    log::info!(
        "Sampled '{}' at {} (requested {time})",
        anim.name(),
        format_seconds(evaluator.time())
    );

    let rows = pose_rows(&rig.skeleton, evaluator.pose());
    print_rows(&rows, &rig.skeleton, format, "Local position", "Local rotation")
}

fn pose_rows(skeleton: &Skeleton, pose: &Pose) -> Vec<JointRow> {
    pose.iter()
        .enumerate()
        .take(skeleton.joint_count())
        .map(|(i, p)| JointRow::new(skeleton, i, p.position, p.rotation))
        .collect()
}

fn print_rows(
    rows: &[JointRow],
    skeleton: &Skeleton,
    format: OutputFormat,
    position_title: &str,
    rotation_title: &str,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
        }
        OutputFormat::Table => {
            let mut table = create_table(vec!["Joint", "Parent", position_title, rotation_title]);
            for row in rows {
                add_table_row(
                    &mut table,
                    vec![
                        row.joint.clone(),
                        row.parent.clone().unwrap_or_else(|| "-".to_string()),
                        format_vec3(Vec3::from_array(row.position)),
                        format_degrees(row.rotation),
                    ],
                );
            }
            table.printstd();
        }
        OutputFormat::Tree => {
            let tree = joint_tree(TreeNode::new("Skeleton", NodeKind::Root), skeleton, |i| {
                rows.get(i)
                    .map(|r| format_vec3(Vec3::from_array(r.position)))
            });
            print!("{}", render_tree(&tree, &TreeOptions::default()));
        }
    }
    Ok(())
}

fn format_degrees(e: [f32; 3]) -> String {
    format!("({:.1}°, {:.1}°, {:.1}°)", e[0], e[1], e[2])
}

/// Attach the skeleton's joints under `root`, labelling each via `detail`
fn joint_tree(
    root: TreeNode,
    skeleton: &Skeleton,
    detail: impl Fn(usize) -> Option<String>,
) -> TreeNode {
    fn build(skeleton: &Skeleton, index: usize, detail: &dyn Fn(usize) -> Option<String>) -> TreeNode {
        let joint = &skeleton.joints()[index];
        let mut node = TreeNode::new(joint.name(), NodeKind::Joint);
        if let Some(text) = detail(index) {
            node = node.with_detail(text);
        }
        joint
            .children()
            .iter()
            .fold(node, |node, &child| node.add_child(build(skeleton, child, detail)))
    }

    if skeleton.is_empty() {
        return root;
    }
    root.add_child(build(skeleton, Skeleton::ROOT, &detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{DataFormat, parse_data};
    use pretty_assertions::assert_eq;

    const RIG: &str = r"
skin:
  joints:
    - name: root
      children: [1]
    - name: tip
      translation: [0, 1, 0]
  inverse_bind_matrices:
    - [1, 0, 0, 0,  0, 1, 0, 0,  0, 0, 1, 0,  0, 0, 0, 1]
    - [1, 0, 0, 0,  0, 1, 0, -1,  0, 0, 1, 0,  0, 0, 0, 1]
animations:
  - name: lift
    channels:
      - joint: 0
        path: translation
        times: [0, 1]
        values: [0, 0, 0,  0, 2, 0]
      - joint: 1
        path: scale
        times: [0]
        values: [1, 1, 1]
blend:
  - clip: lift
";

    fn rig() -> Rig {
        Rig::from_file(parse_data(RIG, DataFormat::Yaml).unwrap()).unwrap()
    }

    #[test]
    fn test_rig_from_yaml() {
        let rig = rig();
        assert_eq!(rig.skeleton.joint_count(), 2);
        assert_eq!(rig.clips.len(), 1);
        assert_eq!(rig.layers[0].mode, BlendMode::Pass);
        assert_eq!(rig.layers[0].weight, 1.0);
        assert_eq!(rig.warnings.len(), 1);
    }

    #[test]
    fn test_animator_plays_layer() {
        let mut animator = rig().animator().unwrap();
        animator.tick(0.5);
        let tip = animator.skeleton().world_position(1).unwrap();
        assert!(tip.abs_diff_eq(Vec3::new(0.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_unknown_layer_clip() {
        let mut rig = rig();
        rig.layers[0].clip = "missing".into();
        let err = rig.animator().unwrap_err();
        assert!(err.to_string().contains("unknown clip 'missing'"));
    }

    #[test]
    fn test_pose_rows() {
        let rig = rig();
        let evaluator = ClipEvaluator::new(Arc::new(rig.clips[0].clone()), &rig.skeleton);
        let rows = pose_rows(&rig.skeleton, evaluator.pose());
        assert_eq!(
            rows[1],
            JointRow {
                joint: "tip".into(),
                parent: Some("root".into()),
                position: [0.0, 1.0, 0.0],
                rotation: [0.0, 0.0, 0.0],
            }
        );
    }
}
