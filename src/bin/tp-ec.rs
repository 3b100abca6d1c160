#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate tp_ec_transport;
use tp_ec_transport::*;

use std::process::exit;
use std::sync::Arc;

const DEFAULT_PORT_DEVICE: &str = "/dev/port";

// decimal, or hexadecimal with "0x" prefix
fn parse_u8(s: &str) -> AResult<u8> {
	let s = s.trim();
	let v = if s.starts_with("0x") || s.starts_with("0X") {
		u8::from_str_radix(&s[2..], 16)?
	} else {
		s.parse::<u8>()?
	};
	Ok(v)
}

fn get_param_u8(matches: &clap::ArgMatches, name: &str) -> AResult<u8> {
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	parse_u8(param).map_err(|e| {
		let msg = format!("invalid parameter {} {:?}: {}", name, param, e);
		e.context(msg).into()
	})
}

type Ec = SharedEc<DevPort, Arc<DiagnosticLog>>;

fn open_ec(matches: &clap::ArgMatches, log: Arc<DiagnosticLog>) -> AResult<Ec> {
	let path = matches.value_of("device").unwrap_or(DEFAULT_PORT_DEVICE);
	let port = open_dev_port(path)?;
	Ok(SharedEc::new(EcTransport::new(port, log)))
}

fn read(ec: &Ec, sub_m: &clap::ArgMatches) -> AResult<()> {
	let offset = get_param_u8(sub_m, "OFFSET")?;

	let data = with_context!(("reading EC register 0x{:02x}", offset), ec.read_byte(offset))?;
	println!("0x{:02x}: 0x{:02x} ({})", offset, data, data);

	Ok(())
}

fn write(ec: &Ec, sub_m: &clap::ArgMatches) -> AResult<()> {
	let offset = get_param_u8(sub_m, "OFFSET")?;
	let value = get_param_u8(sub_m, "VALUE")?;

	with_context!(("writing 0x{:02x} to EC register 0x{:02x}", value, offset), ec.write_byte(offset, value))?;
	info!("EC register 0x{:02x} set to 0x{:02x}", offset, value);

	Ok(())
}

fn dump(ec: &Ec) -> AResult<()> {
	let mut failed = 0usize;

	print!("  ");
	for col in 0..16 {
		print!(" {:02x}", col);
	}
	println!("");

	for row in 0..16u8 {
		print!("{:02x}", row << 4);
		for col in 0..16u8 {
			let offset = row << 4 | col;
			match ec.read_byte(offset) {
				Ok(data) => print!(" {:02x}", data),
				Err(e) => {
					debug!("register 0x{:02x}: {}", offset, e);
					failed += 1;
					print!(" --");
				}
			}
		}
		println!("");
	}

	ensure!(0 == failed, "failed to read {} EC registers", failed);
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg verbose: -v --verbose ... "record register reads in the diagnostic log (printed at exit)")
		(@arg device: -d --device +takes_value "port device to use (default: /dev/port)")
		(@subcommand read =>
			(about: "read EC register")
			(@arg OFFSET: +required "register offset (0-255 or 0x00-0xff)")
		)
		(@subcommand write =>
			(about: "write EC register")
			(@arg OFFSET: +required "register offset (0-255 or 0x00-0xff)")
			(@arg VALUE: +required "value to write (0-255 or 0x00-0xff)")
		)
		(@subcommand dump =>
			(about: "read all 256 EC registers")
		)
	).get_matches();

	let log = Arc::new(DiagnosticLog::new(matches.occurrences_of("verbose") as u32));
	let ec = open_ec(&matches, log.clone())?;

	let result = match matches.subcommand() {
		("read", Some(sub_m)) => {
			read(&ec, sub_m)
		}
		("write", Some(sub_m)) => {
			write(&ec, sub_m)
		}
		("dump", _) => {
			dump(&ec)
		}
		("", _) => Err(format_err!("no subcommand")),
		(cmd, _) => Err(format_err!("not implemented subcommand {:?}", cmd)),
	};

	if log.enabled() && !log.is_empty() {
		eprint!("{}", log.contents());
	}

	result
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
