use std::io;
use std::net::SocketAddr;

use tokio::net::TcpStream;

use crate::ports::Socket;

impl Socket for TcpStream {
    fn remote_endpoint(&self) -> io::Result<SocketAddr> {
        self.peer_addr()
    }
}
