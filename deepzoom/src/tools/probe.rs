use anyhow::{Context, Result};
use deepzoom::{
	core::{NormalizePlan, PyramidPlan, Rotation, TileSizeRange, TileSizeResolver},
	image::{DynamicImageEngine, ImageEngine},
	input::resolve_input,
};
use std::fmt::Write;

#[derive(clap::Args, Debug)]
#[command(arg_required_else_help = true, disable_version_flag = true)]
pub struct Subcommand {
	/// image file, directory of images, or <directory>#<n>
	#[arg(required = true)]
	input: String,

	/// rotate the source clockwise: 0, 90, 180 or 270
	#[arg(long, short, value_name = "DEG", default_value_t = 0)]
	rotation: u32,

	/// smallest acceptable tile size
	#[arg(long, value_name = "int", default_value_t = 200)]
	min_tile_size: u32,

	/// largest acceptable tile size
	#[arg(long, value_name = "int", default_value_t = 300)]
	max_tile_size: u32,

	/// use exactly this tile size
	#[arg(long, short, value_name = "int")]
	tile_size: Option<String>,

	/// lowest zoom level
	#[arg(long, value_name = "int", default_value_t = 0)]
	min_zoom: u8,

	/// highest zoom level
	#[arg(long, value_name = "int")]
	max_zoom: Option<u8>,
}

pub fn run(arguments: &Subcommand) -> Result<()> {
	let engine = DynamicImageEngine::new();
	let rotation = Rotation::try_from(arguments.rotation)?;
	let resolver = TileSizeResolver::new(TileSizeRange::new(arguments.min_tile_size, arguments.max_tile_size))
		.with_override(arguments.tile_size.clone());

	for image in resolve_input(&arguments.input)? {
		let (width, height) = engine
			.probe(&image)
			.with_context(|| format!("probing {image:?}"))?;
		print!("{}", describe(&image.display().to_string(), width, height, rotation, &resolver, arguments)?);
	}
	Ok(())
}

fn describe(
	name: &str,
	width: u32,
	height: u32,
	rotation: Rotation,
	resolver: &TileSizeResolver,
	arguments: &Subcommand,
) -> Result<String> {
	let (width, height) = rotation.rotated_size(width, height);
	let config = resolver.resolve(width.max(height))?;
	let normalize = NormalizePlan::new(width, height, &config)?;
	let working_size = u32::try_from(config.working_size()).context("working size is too large")?;
	let plan = PyramidPlan::new(config.tile_size, working_size, arguments.min_zoom, arguments.max_zoom)?;

	let mut text = String::new();
	writeln!(text, "{name}")?;
	writeln!(text, "  size:        {width}x{height} (rotated by {rotation})")?;
	writeln!(text, "  tile size:   {}", config.tile_size)?;
	writeln!(text, "  working:     {working_size}x{working_size}, difference {}", config.difference)?;
	writeln!(text, "  normalize:   {normalize:?}")?;
	for level in plan.levels() {
		let size = plan.level_size(level);
		writeln!(text, "  level {level:>2}:    {size}x{size}, {} tiles", plan.tile_count(level))?;
	}
	writeln!(text, "  total tiles: {}", plan.total_tile_count())?;
	Ok(text)
}
