use argh::FromArgs;

/// Wall-bounce trainer: tracks a thrown ball and scores each wall hit
#[derive(FromArgs, Debug)]
pub struct Args {
    /// source: video file or directory of image frames
    #[argh(option, default = "String::from(\"./video/throws.mp4\")")]
    pub source: String,

    /// max buffer size for the tracking trail
    #[argh(option, default = "64")]
    pub buffer: usize,

    /// lower HSV bound for the ball color, as "h,s,v"
    #[argh(option, default = "String::from(\"0,88,91\")")]
    pub hsv_lower: String,

    /// upper HSV bound for the ball color, as "h,s,v"
    #[argh(option, default = "String::from(\"56,255,255\")")]
    pub hsv_upper: String,

    /// bullseye x coordinate in resized-frame pixels
    #[argh(option, default = "300.0")]
    pub target_x: f32,

    /// bullseye y coordinate in resized-frame pixels
    #[argh(option, default = "180.0")]
    pub target_y: f32,

    /// unique observations to wait before accepting another reversal
    #[argh(option, default = "10")]
    pub max_diminish: i32,

    /// require the longer warm-up before direction is evaluated
    #[argh(switch)]
    pub no_cool_off_override: bool,

    /// width frames are resized to before detection
    #[argh(option, default = "600")]
    pub width: u32,

    /// record the annotated video
    #[argh(switch)]
    pub record: bool,

    /// disable audio feedback
    #[argh(switch)]
    pub mute: bool,

    /// directory containing the feedback sounds
    #[argh(option, default = "String::from(\"./sounds\")")]
    pub sounds: String,

    /// where to move the recorded video when set
    #[argh(option, default = "String::new()")]
    pub output_filepath: String,
}
