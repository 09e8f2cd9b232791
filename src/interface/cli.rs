use std::path::PathBuf;

use clap::{App, ArgMatches};

use skeleton::config::Profile;
use skeleton::graphics::{Filter, SamplerParams, Wrap};
use skeleton::{ConfigError, Key, Lesson, LessonOptions, LoopConfig};

/// Everything the command line decides.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    pub lesson: Lesson,
    pub config: LoopConfig,
    pub assets: LessonOptions,
}

pub fn cli_main() -> Result<Options, ConfigError> {
    let yaml = load_yaml!("cli.yaml");
    let matches = App::from_yaml(yaml).get_matches();

    options_from(&matches)
}

fn options_from(matches: &ArgMatches) -> Result<Options, ConfigError> {
    let lesson = matches.value_of("LESSON").unwrap_or("texture").parse::<Lesson>()?;

    let mut config = LoopConfig::default();
    if let Some(width) = matches.value_of("width") {
        config.context.width = dimension("width", width)?;
    }
    if let Some(height) = matches.value_of("height") {
        config.context.height = dimension("height", height)?;
    }
    if let Some(title) = matches.value_of("title") {
        config.context.title = title.to_string();
    }
    if let Some(key) = matches.value_of("close-key") {
        config.close_key = key.parse::<Key>()?;
    }
    if let Some(profile) = matches.value_of("profile") {
        config.context.profile = profile.parse::<Profile>()?;
    }
    config.context.vsync = !matches.is_present("no-vsync");

    let mut sampler = SamplerParams::default();
    if let Some(wrap) = matches.value_of("wrap") {
        let wrap = wrap.parse::<Wrap>()?;
        sampler.wrap_s = wrap;
        sampler.wrap_t = wrap;
    }
    if let Some(filter) = matches.value_of("filter") {
        let filter = filter.parse::<Filter>()?;
        sampler.min_filter = filter;
        sampler.mag_filter = filter;
    }

    let assets = LessonOptions {
        vertex_shader: matches.value_of("vertex-shader").map(PathBuf::from),
        fragment_shader: matches.value_of("fragment-shader").map(PathBuf::from),
        texture: matches.value_of("texture").map(PathBuf::from),
        sampler,
    };

    Ok(Options { lesson, config, assets })
}

fn dimension(name: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.parse::<u32>() {
        Ok(pixels) if pixels > 0 => Ok(pixels),
        _ => Err(ConfigError::InvalidValue { name, value: value.to_string() }),
    }
}
