use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("hostmsg {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: hostmsg");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!(
        "build_target: {}",
        option_env!("HOSTMSG_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "build_profile: {}",
        option_env!("HOSTMSG_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("HOSTMSG_GIT_HASH").unwrap_or("unknown"));
    println!("frame_prefix: {}", hostmsg_frame::FRAME_PREFIX);
    println!(
        "features: client={}, cli=true",
        cfg!(feature = "client")
    );

    Ok(SUCCESS)
}
