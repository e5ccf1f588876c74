//! Default encoding transform.
//!
//! One 720p H.264 layer plus stereo AAC, written as a single MP4 named after
//! the input (`{Basename}{Extension}`).

use serde_json::{json, Value};

pub const DEFAULT_TRANSFORM_DESCRIPTION: &str = "Single bitrate 720p H.264/AAC MP4 encode";

/// Request body for `PUT .../transforms/{name}`.
pub fn standard_encoder_transform() -> Value {
    json!({
        "properties": {
            "description": DEFAULT_TRANSFORM_DESCRIPTION,
            "outputs": [{
                "onError": "StopProcessingJob",
                "relativePriority": "Normal",
                "preset": {
                    "@odata.type": "#Microsoft.Media.StandardEncoderPreset",
                    "codecs": [
                        {
                            "@odata.type": "#Microsoft.Media.AacAudio",
                            "channels": 2,
                            "samplingRate": 48000,
                            "bitrate": 128000,
                            "profile": "AacLc"
                        },
                        {
                            "@odata.type": "#Microsoft.Media.H264Video",
                            "complexity": "Quality",
                            "keyFrameInterval": "PT2S",
                            "layers": [{
                                "bitrate": 1000000,
                                "width": "1280",
                                "height": "720"
                            }]
                        }
                    ],
                    "formats": [{
                        "@odata.type": "#Microsoft.Media.Mp4Format",
                        "filenamePattern": "{Basename}{Extension}"
                    }]
                }
            }]
        }
    })
}
